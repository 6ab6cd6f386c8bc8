//! Comparison requests and their validation

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_input, Result};
use chartdiff_core_types::redact_userinfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

const ALLOWED_SCHEMES: [&str; 3] = ["https://", "http://", "git@"];

/// Optional values overlay; inline content wins over a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuesOverlay {
    None,
    Inline(String),
    /// Path relative to the repository root
    File(String),
}

impl ValuesOverlay {
    /// # Errors
    ///
    /// `InvalidInput` when a values file path is absolute or climbs out of
    /// the repository root.
    pub fn validate(&self) -> Result<()> {
        match self {
            ValuesOverlay::File(path) => validate_relative("valuesFile", path),
            ValuesOverlay::None | ValuesOverlay::Inline(_) => Ok(()),
        }
    }
}

/// One chart at one version
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSource {
    pub repository: String,
    pub chart_path: String,
    pub version: String,
}

impl fmt::Debug for ChartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartSource")
            .field("repository", &redact_userinfo(&self.repository))
            .field("chart_path", &self.chart_path)
            .field("version", &self.version)
            .finish()
    }
}

impl ChartSource {
    /// # Errors
    ///
    /// `InvalidInput` when a field is blank, the repository scheme is not
    /// supported, the chart path is not relative or the version looks like a
    /// command-line option.
    pub fn validate(&self) -> Result<()> {
        validate_repository(&self.repository)?;
        require("chartPath", &self.chart_path)?;
        validate_relative("chartPath", self.chart_path.trim())?;
        validate_version("version", &self.version)
    }
}

/// Input of one comparison
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub repository: String,
    pub chart_path: String,
    pub version1: String,
    pub version2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_content: Option<String>,
    #[serde(default)]
    pub ignore_labels: bool,
}

impl fmt::Debug for CompareRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareRequest")
            .field("repository", &redact_userinfo(&self.repository))
            .field("chart_path", &self.chart_path)
            .field("version1", &self.version1)
            .field("version2", &self.version2)
            .field("values_file", &self.values_file)
            .field("values_content", &self.values_content.as_ref().map(|c| c.len()))
            .field("ignore_labels", &self.ignore_labels)
            .finish()
    }
}

impl CompareRequest {
    /// # Errors
    ///
    /// `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_repository(&self.repository)?;
        require("chartPath", &self.chart_path)?;
        validate_relative("chartPath", self.chart_path.trim())?;
        validate_version("version1", &self.version1)?;
        validate_version("version2", &self.version2)?;
        self.values_overlay().validate()
    }

    pub fn values_overlay(&self) -> ValuesOverlay {
        match (&self.values_content, &self.values_file) {
            (Some(content), _) if !content.trim().is_empty() => ValuesOverlay::Inline(content.clone()),
            (_, Some(file)) if !file.trim().is_empty() => ValuesOverlay::File(file.trim().to_string()),
            _ => ValuesOverlay::None,
        }
    }

    pub fn left(&self) -> ChartSource {
        self.source(&self.version1)
    }

    pub fn right(&self) -> ChartSource {
        self.source(&self.version2)
    }

    fn source(&self, version: &str) -> ChartSource {
        ChartSource {
            repository: self.repository.trim().to_string(),
            chart_path: self.chart_path.trim().to_string(),
            version: version.trim().to_string(),
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid_input(format!("Missing required field: {}", field)));
    }
    Ok(())
}

/// Repository URL must be non-blank and use a supported scheme
///
/// # Errors
///
/// `InvalidInput` otherwise.
pub fn validate_repository(repository: &str) -> Result<()> {
    require("repository", repository)?;
    let trimmed = repository.trim();
    if !ALLOWED_SCHEMES.iter().any(|s| trimmed.starts_with(s)) {
        return Err(invalid_input(format!(
            "Invalid repository URL: {}. Expected https://, http:// or git@",
            redact_userinfo(trimmed)
        )));
    }
    Ok(())
}

fn validate_version(field: &str, version: &str) -> Result<()> {
    require(field, version)?;
    if version.trim().starts_with('-') {
        return Err(invalid_input(format!("Invalid {}: {}", field, version.trim())));
    }
    Ok(())
}

fn validate_relative(field: &str, path: &str) -> Result<()> {
    let escapes = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(invalid_input(format!(
            "Invalid {}: {} must be relative to the repository root",
            field, path
        )));
    }
    Ok(())
}
