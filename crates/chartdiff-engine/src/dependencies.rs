//! Two-phase dependency resolution
//!
//! Right after extraction a build is attempted on a best-effort basis:
//! repositories registered moments earlier may not be indexed yet, so a
//! failure there is only a warning. Immediately before rendering the build
//! must succeed.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::helm::Helm;
use chartdiff_core::errors::ExError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyPhase {
    Unresolved,
    AttemptedBestEffort { warning: Option<String> },
    Resolved,
    Fatal,
}

/// Dependency state of one extracted chart
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    chart_dir: PathBuf,
    version: String,
    phase: DependencyPhase,
}

impl DependencyResolver {
    pub fn new(chart_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            chart_dir: chart_dir.into(),
            version: version.into(),
            phase: DependencyPhase::Unresolved,
        }
    }

    pub fn phase(&self) -> &DependencyPhase {
        &self.phase
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// First attempt; never fails
    pub fn best_effort(&mut self, helm: &Helm<'_>) {
        if self.phase != DependencyPhase::Unresolved {
            return;
        }
        let warning = match helm.build_dependencies(&self.chart_dir, &self.version) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    version = %self.version,
                    error = %e,
                    "dependency build failed, retrying before render"
                );
                Some(e.message().to_string())
            }
        };
        self.phase = DependencyPhase::AttemptedBestEffort { warning };
    }

    /// Attempt that must succeed
    ///
    /// # Errors
    ///
    /// The build error (normally `DependencyResolution`); the phase becomes
    /// `Fatal`.
    pub fn require(&mut self, helm: &Helm<'_>) -> Result<()> {
        if self.phase == DependencyPhase::Resolved {
            return Ok(());
        }
        match helm.build_dependencies(&self.chart_dir, &self.version) {
            Ok(()) => {
                self.phase = DependencyPhase::Resolved;
                Ok(())
            }
            Err(e) => {
                self.phase = DependencyPhase::Fatal;
                Err(with_version(e, &self.version))
            }
        }
    }
}

fn with_version(err: ExError, version: &str) -> ExError {
    if err.version().is_some() {
        err
    } else {
        err.with_version(version)
    }
}
