//! Render pipeline stages shared by the public operations
//!
//! A comparison clones once, then prepares each side in turn (checkout,
//! extraction, best-effort dependency build) because both sides share one
//! working tree. Once extracted, the sides are independent and can be
//! finished (required dependency build, render) concurrently.

#![allow(clippy::result_large_err)]

use crate::config::PipelineConfig;
use crate::dependencies::DependencyResolver;
use crate::errors::{invalid_input, Result};
use crate::git::Git;
use crate::helm::Helm;
use crate::process::{CancelToken, CommandRunner};
use crate::request::ValuesOverlay;
use chartdiff_core::model::SourceMetadata;
use chartdiff_store::errors::io_error;
use chartdiff_store::{extract_chart, resolve_in_checkout, Side, Workspace};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Everything a stage needs to run external tools
#[derive(Clone, Copy)]
pub struct Toolchain<'a> {
    pub runner: &'a dyn CommandRunner,
    pub config: &'a PipelineConfig,
    pub cancel: &'a CancelToken,
}

impl<'a> Toolchain<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a PipelineConfig,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            runner,
            config,
            cancel,
        }
    }

    pub fn git(&self) -> Git<'a> {
        Git::new(self.runner, self.config, self.cancel)
    }

    pub fn helm(&self) -> Helm<'a> {
        Helm::new(self.runner, self.config, self.cancel)
    }
}

/// One side extracted into the workspace
#[derive(Debug)]
pub struct PreparedChart {
    pub side: Side,
    pub version: String,
    pub dependencies: DependencyResolver,
}

/// Values overlay materialised on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedValues {
    pub path: Option<PathBuf>,
    /// sha256 hex of the overlay bytes
    pub hash: Option<String>,
}

/// Check out `version`, copy the chart out and attempt its dependencies once
///
/// # Errors
///
/// `VersionNotFound`, `ChartPathNotFound` or runner errors. Dependency
/// failures are not errors at this stage.
pub fn prepare(
    tools: &Toolchain<'_>,
    workspace: &Workspace,
    side: Side,
    chart_path: &str,
    version: &str,
) -> Result<PreparedChart> {
    let repo_dir = workspace.repo_dir();
    tools.git().checkout(&repo_dir, version)?;
    let chart_dir = extract_chart(&repo_dir, chart_path, version, &workspace.chart_dir(side))?;

    let mut dependencies = DependencyResolver::new(chart_dir, version);
    dependencies.best_effort(&tools.helm());
    Ok(PreparedChart {
        side,
        version: version.to_string(),
        dependencies,
    })
}

/// Build dependencies for good and render
///
/// # Errors
///
/// `DependencyResolution`, `TemplateRender` or runner errors.
pub fn finish(
    tools: &Toolchain<'_>,
    prepared: &mut PreparedChart,
    values: Option<&Path>,
) -> Result<String> {
    let helm = tools.helm();
    prepared.dependencies.require(&helm)?;
    helm.template(prepared.dependencies.chart_dir(), values, &prepared.version)
}

/// Put the overlay where helm can read it
///
/// Inline content is written into the workspace; a file is resolved against
/// the repository root as currently checked out and must really live there,
/// symlinks included.
///
/// # Errors
///
/// `InvalidInput` when the values file path is not relative, does not exist
/// or resolves outside the checkout. `Io` on write or read failure.
pub fn resolve_values(workspace: &Workspace, overlay: &ValuesOverlay) -> Result<ResolvedValues> {
    overlay.validate()?;
    match overlay {
        ValuesOverlay::None => Ok(ResolvedValues::default()),
        ValuesOverlay::Inline(content) => {
            let path = workspace.write_values(content)?;
            Ok(ResolvedValues {
                path: Some(path),
                hash: Some(sha256_hex(content.as_bytes())),
            })
        }
        ValuesOverlay::File(rel) => {
            let path = match resolve_in_checkout(&workspace.repo_dir(), rel) {
                Some(path) if path.is_file() => path,
                _ => return Err(invalid_input(format!("Values file not found: {}", rel))),
            };
            let bytes = std::fs::read(&path).map_err(|e| io_error("read_values_file", e))?;
            Ok(ResolvedValues {
                path: Some(path),
                hash: Some(sha256_hex(&bytes)),
            })
        }
    }
}

pub fn source_metadata(chart_path: &str, version: &str, values: &ResolvedValues) -> SourceMetadata {
    SourceMetadata {
        chart: Some(chart_path.to_string()),
        values_hash: values.hash.clone(),
        ..SourceMetadata::helm(version)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
