//! Pipeline configuration
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `CHARTDIFF_*` environment variables (`__` separates sections, so
//! `CHARTDIFF_TIMEOUTS__RENDER_SECS=90` sets `timeouts.render_secs`).

#![allow(clippy::result_large_err)]

use crate::errors::{config_error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MB: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub tools: ToolPaths,

    /// Parent of per-comparison workspaces
    #[serde(default = "default_work_root")]
    pub work_root: PathBuf,

    /// Use the built-in semantic differ before any plain diff
    #[serde(default = "default_true", deserialize_with = "flag_default_true")]
    pub internal_diff_enabled: bool,

    /// Try `dyff` before the naive line diff
    #[serde(default, deserialize_with = "flag_default_false")]
    pub dyff_enabled: bool,

    /// Leave each workspace on disk after the operation, for debugging
    #[serde(default, deserialize_with = "flag_default_false")]
    pub keep_workspace: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            limits: Limits::default(),
            tools: ToolPaths::default(),
            work_root: default_work_root(),
            internal_diff_enabled: true,
            dyff_enabled: false,
            keep_workspace: false,
        }
    }
}

/// Per-step deadlines, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub clone_secs: u64,
    pub fetch_tags_secs: u64,
    pub fetch_all_secs: u64,
    pub checkout_secs: u64,
    pub list_refs_secs: u64,
    pub repo_add_secs: u64,
    pub repo_update_secs: u64,
    pub dependency_build_secs: u64,
    pub render_secs: u64,
    pub dyff_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            clone_secs: 120,
            fetch_tags_secs: 30,
            fetch_all_secs: 60,
            checkout_secs: 15,
            list_refs_secs: 5,
            repo_add_secs: 30,
            repo_update_secs: 60,
            dependency_build_secs: 120,
            render_secs: 60,
            dyff_secs: 10,
        }
    }
}

impl Timeouts {
    pub fn of(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }
}

/// Output caps (bytes per stream) and sample sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub git_output_bytes: usize,
    pub repo_add_output_bytes: usize,
    pub repo_update_output_bytes: usize,
    pub dependency_build_output_bytes: usize,
    pub render_output_bytes: usize,
    pub dyff_output_bytes: usize,
    /// Tags and branches quoted in a version-not-found error
    pub ref_sample_size: usize,
    pub max_listed_tags: usize,
    pub max_listed_branches: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            git_output_bytes: MB,
            repo_add_output_bytes: 2 * MB,
            repo_update_output_bytes: 5 * MB,
            dependency_build_output_bytes: 5 * MB,
            render_output_bytes: 10 * MB,
            dyff_output_bytes: 10 * MB,
            ref_sample_size: 10,
            max_listed_tags: 50,
            max_listed_branches: 20,
        }
    }
}

/// External binaries, resolved through `PATH` unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub git: String,
    pub helm: String,
    pub dyff: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            helm: "helm".to_string(),
            dyff: "dyff".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_work_root() -> PathBuf {
    std::env::temp_dir().join("chartdiff")
}

/// Interpret a loosely typed switch value
///
/// Returns `None` for anything that is not a recognised spelling.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn lenient_flag<'de, D>(deserializer: D, default: bool) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match FlagValue::deserialize(deserializer)? {
        FlagValue::Bool(b) => Some(b),
        FlagValue::Int(1) => Some(true),
        FlagValue::Int(0) => Some(false),
        FlagValue::Int(other) => parse_flag(&other.to_string()),
        FlagValue::Text(text) => {
            let parsed = parse_flag(&text);
            if parsed.is_none() {
                tracing::warn!(value = %text, default, "unrecognised switch value, keeping default");
            }
            parsed
        }
    };
    Ok(parsed.unwrap_or(default))
}

fn flag_default_true<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    lenient_flag(d, true)
}

fn flag_default_false<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    lenient_flag(d, false)
}

impl PipelineConfig {
    /// Load configuration from defaults, `path` and the process environment
    ///
    /// # Errors
    ///
    /// `Config` if the file is unreadable or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`PipelineConfig::load`] with an explicit environment map
    /// instead of the process environment
    ///
    /// # Errors
    ///
    /// `Config` if the file is unreadable or a value has the wrong shape.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = config::Config::try_from(&PipelineConfig::default())
            .map_err(|e| config_error(e.to_string()))?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CHARTDIFF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let loaded: PipelineConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| config_error(e.to_string()))?;
        tracing::debug!(
            work_root = %loaded.work_root.display(),
            internal_diff = loaded.internal_diff_enabled,
            dyff = loaded.dyff_enabled,
            "pipeline configuration loaded"
        );
        Ok(loaded)
    }

    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }
}
