//! Helm driver: repository registration, dependency build and rendering

#![allow(clippy::result_large_err)]

use crate::config::{PipelineConfig, Timeouts};
use crate::errors::{dependency_failed, render_failed, Result};
use crate::process::{CancelToken, CommandRunner, CommandSpec, ProcessOutput};
use chartdiff_store::errors::io_error;
use chartdiff_store::ChartDescriptor;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::LazyLock;

const MAX_REPO_NAME: usize = 50;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("static regex"));
static NON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9-]+").expect("static regex"));
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("static regex"));

/// Local alias for a chart repository URL
///
/// `https://charts.bitnami.com/bitnami` becomes `charts-bitnami-com-bitnami`.
/// URLs with nothing usable fall back to `repo-` plus a short URL digest.
pub fn repo_name(url: &str) -> String {
    let stripped = SCHEME.replace(url.trim(), "");
    let stripped = stripped.strip_prefix("www.").unwrap_or(&*stripped);
    let dashed = NON_NAME.replace_all(stripped, "-");
    let collapsed = DASH_RUN.replace_all(&dashed, "-");
    let mut name: String = collapsed.trim_matches('-').to_lowercase();
    name.truncate(MAX_REPO_NAME);
    let name = name.trim_end_matches('-').to_string();
    if name.is_empty() {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        format!("repo-{}", &digest[..8])
    } else {
        name
    }
}

/// Helm operations bound to one runner, configuration and cancel token
pub struct Helm<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a PipelineConfig,
    cancel: &'a CancelToken,
}

impl<'a> Helm<'a> {
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

    fn command<I, S>(&self, args: I, timeout_secs: u64, max_output: usize) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.config.tools.helm.clone(), args)
            .timeout(Timeouts::of(timeout_secs))
            .max_output(max_output)
    }

    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        self.runner.run(spec, self.cancel)
    }

    /// Register each repository, then refresh the index
    ///
    /// Nothing here is fatal: a repository that cannot be added surfaces
    /// later as a dependency build failure.
    pub fn register_repositories(&self, urls: &[String]) {
        let t = &self.config.timeouts;
        let l = &self.config.limits;
        for url in urls {
            let name = repo_name(url);
            let add = self.command(
                ["repo", "add", name.as_str(), url.as_str()],
                t.repo_add_secs,
                l.repo_add_output_bytes,
            );
            match self.run(&add) {
                Ok(out) if out.success() => {
                    tracing::debug!(repo = %name, url = %url, "helm repository added");
                    continue;
                }
                Ok(out) => tracing::debug!(repo = %name, detail = %out.failure_detail().trim(), "helm repo add failed, trying update"),
                Err(e) => tracing::debug!(repo = %name, error = %e, "helm repo add failed, trying update"),
            }
            let update = self.command(
                ["repo", "update", name.as_str()],
                t.repo_update_secs,
                l.repo_update_output_bytes,
            );
            match self.run(&update) {
                Ok(out) if out.success() => {}
                Ok(out) => tracing::warn!(repo = %name, url = %url, detail = %out.failure_detail().trim(), "could not register helm repository"),
                Err(e) => tracing::warn!(repo = %name, url = %url, error = %e, "could not register helm repository"),
            }
        }

        let update = self.command(["repo", "update"], t.repo_update_secs, l.repo_update_output_bytes);
        match self.run(&update) {
            Ok(out) if out.success() => {}
            Ok(out) => tracing::warn!(detail = %out.failure_detail().trim(), "helm repo update failed"),
            Err(e) => tracing::warn!(error = %e, "helm repo update failed"),
        }
    }

    /// Vendor declared dependencies into `<chart_dir>/charts`
    ///
    /// # Errors
    ///
    /// `DependencyResolution` when the build exits non-zero, `Io` when the
    /// `charts/` folder cannot be created, runner errors otherwise.
    pub fn build_dependencies(&self, chart_dir: &Path, version: &str) -> Result<()> {
        let Some(descriptor) = ChartDescriptor::load(chart_dir)? else {
            tracing::debug!(version, "no Chart.yaml, skipping dependency build");
            return Ok(());
        };
        if !descriptor.needs_build() {
            tracing::debug!(version, "chart declares no dependencies");
            return Ok(());
        }

        let repositories = descriptor.dependency_repositories();
        if !repositories.is_empty() {
            self.register_repositories(&repositories);
        }

        let vendor_dir = chart_dir.join("charts");
        std::fs::create_dir_all(&vendor_dir).map_err(|e| io_error("create_charts_dir", e))?;

        let spec = self.command(
            [
                "dependency".to_string(),
                "build".to_string(),
                chart_dir.display().to_string(),
            ],
            self.config.timeouts.dependency_build_secs,
            self.config.limits.dependency_build_output_bytes,
        );
        let out = self.run(&spec)?;
        if !out.success() {
            return Err(dependency_failed(version, out.failure_detail()));
        }

        for line in out.stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let lower = line.to_lowercase();
            if !lower.contains("warning") && !lower.contains("info") {
                tracing::warn!(version, line, "helm dependency build diagnostic");
            }
        }

        let vendored = std::fs::read_dir(&vendor_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        if vendored == 0 && !descriptor.dependencies.is_empty() {
            tracing::warn!(version, "dependency build produced an empty charts/ directory");
        }
        tracing::debug!(version, vendored, "dependencies built");
        Ok(())
    }

    /// Render the chart into one multi-document manifest stream
    ///
    /// # Errors
    ///
    /// `TemplateRender` on non-zero exit or on diagnostic output that is not
    /// a tool warning; runner errors otherwise.
    pub fn template(&self, chart_dir: &Path, values: Option<&Path>, version: &str) -> Result<String> {
        let mut args = vec![
            "template".to_string(),
            "app".to_string(),
            chart_dir.display().to_string(),
        ];
        if let Some(values) = values {
            args.push("-f".to_string());
            args.push(values.display().to_string());
        }
        let spec = self.command(
            args,
            self.config.timeouts.render_secs,
            self.config.limits.render_output_bytes,
        );
        let out = self.run(&spec)?;
        if !out.success() {
            return Err(render_failed(version, out.failure_detail()));
        }

        let stderr = out.stderr.trim();
        if !stderr.is_empty() {
            if !only_warnings(stderr) {
                return Err(render_failed(version, stderr));
            }
            tracing::warn!(version, diagnostics = %stderr, "helm template warnings");
        }
        Ok(out.stdout)
    }
}

/// Every non-blank line mentions a warning, in any case
fn only_warnings(stderr: &str) -> bool {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.to_ascii_lowercase().contains("warning"))
}
