//! `Chart.yaml` parsing.
//!
//! Only the dependency declarations matter here. The descriptor is parsed as
//! YAML; when that fails (templated or hand-broken files are common in the
//! wild) the `dependencies:` and `repositories:` blocks are scanned
//! textually instead.

#![allow(clippy::result_large_err)]

use crate::errors::{descriptor_error, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

pub const CHART_FILE: &str = "Chart.yaml";

static DEPENDENCIES_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^dependencies:[ \t]*\n((?:[ \t]+.*\n?)+)").expect("static regex")
});
static REPOSITORIES_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^repositories:[ \t]*\n((?:[ \t]+.*\n?)+)").expect("static regex")
});
static REPOSITORY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"repository:[ \t]*["']?([^"'\n\s][^"'\n]*)["']?"#).expect("static regex")
});
static URL_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url:[ \t]*["']?([^"'\n\s][^"'\n]*)["']?"#).expect("static regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Deprecated top-level `repositories` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LegacyRepository {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: Option<Vec<Dependency>>,
    #[serde(default)]
    repositories: Option<Vec<LegacyRepository>>,
}

/// Dependency view of one chart descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartDescriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub repositories: Vec<LegacyRepository>,
    /// The descriptor has a `dependencies` key, even if no usable URL
    pub declares_dependencies: bool,
}

impl ChartDescriptor {
    /// Parse descriptor text, falling back to a block scan on invalid YAML
    pub fn parse(text: &str) -> Self {
        match serde_yaml::from_str::<RawDescriptor>(text) {
            Ok(raw) => Self {
                declares_dependencies: raw.dependencies.is_some()
                    || text.contains("dependencies:"),
                name: raw.name,
                version: raw.version,
                dependencies: raw.dependencies.unwrap_or_default(),
                repositories: raw.repositories.unwrap_or_default(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "chart descriptor is not valid YAML, scanning text");
                Self::scan(text)
            }
        }
    }

    fn scan(text: &str) -> Self {
        let dependencies = block(&DEPENDENCIES_BLOCK, text)
            .map(|b| {
                REPOSITORY_FIELD
                    .captures_iter(b)
                    .map(|c| Dependency {
                        repository: Some(c[1].trim().to_string()),
                        ..Dependency::default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        let repositories = block(&REPOSITORIES_BLOCK, text)
            .map(|b| {
                URL_FIELD
                    .captures_iter(b)
                    .map(|c| LegacyRepository {
                        name: None,
                        url: Some(c[1].trim().to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: None,
            version: None,
            dependencies,
            repositories,
            declares_dependencies: text.contains("dependencies:"),
        }
    }

    /// Read `<chart_dir>/Chart.yaml`; `Ok(None)` when the file does not exist
    ///
    /// # Errors
    ///
    /// `DependencyResolution` if the file exists but cannot be read.
    pub fn load(chart_dir: &Path) -> Result<Option<Self>> {
        let path = chart_dir.join(CHART_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(Self::parse(&text))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(descriptor_error(&path, e)),
        }
    }

    /// Remote repositories that must be registered before a dependency build
    ///
    /// Only `http://` and `https://` URLs are kept. Alias references
    /// (`@name`) and `oci://` registries are skipped. Order of first
    /// occurrence is preserved and duplicates are dropped.
    pub fn dependency_repositories(&self) -> Vec<String> {
        let declared = self
            .dependencies
            .iter()
            .filter_map(|d| d.repository.as_deref())
            .chain(self.repositories.iter().filter_map(|r| r.url.as_deref()));

        let mut out: Vec<String> = Vec::new();
        for url in declared {
            let url = url.trim();
            if url.starts_with('@') || url.starts_with("oci://") {
                continue;
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                continue;
            }
            if !out.iter().any(|u| u == url) {
                out.push(url.to_string());
            }
        }
        out
    }

    /// Whether a dependency build is needed at all
    pub fn needs_build(&self) -> bool {
        self.declares_dependencies || !self.dependency_repositories().is_empty()
    }
}

fn block<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
