//! Git driver
//!
//! Credential prompts are disabled for every invocation, so an
//! authentication challenge fails fast instead of hanging.

#![allow(clippy::result_large_err)]

use crate::config::{PipelineConfig, Timeouts};
use crate::errors::{clone_failed, invalid_input, version_not_found, Result};
use crate::process::{CancelToken, CommandRunner, CommandSpec, ProcessOutput};
use chartdiff_core_types::{redact_userinfo, Sensitive};
use std::path::Path;

/// Environment applied to every git process
pub const GIT_ENV: [(&str, &str); 3] = [
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_ASKPASS", ""),
    ("GIT_CREDENTIAL_HELPER", ""),
];

/// Git operations bound to one runner, configuration and cancel token
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a PipelineConfig,
    cancel: &'a CancelToken,
}

impl<'a> Git<'a> {
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

    fn command<I, S>(&self, args: I, timeout_secs: u64) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GIT_ENV.iter().fold(
            CommandSpec::new(self.config.tools.git.clone(), args)
                .timeout(Timeouts::of(timeout_secs))
                .max_output(self.config.limits.git_output_bytes),
            |spec, (k, v)| spec.env(*k, *v),
        )
    }

    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        self.runner.run(spec, self.cancel)
    }

    /// Full clone followed by a tag fetch
    ///
    /// # Errors
    ///
    /// `RepositoryClone` when either step exits non-zero. Runner failures
    /// (timeout, output cap, missing binary) pass through.
    pub fn clone_repository(&self, url: &Sensitive<String>, dest: &Path) -> Result<()> {
        let redacted = redact_userinfo(url.expose());
        tracing::debug!(repository = %redacted, dest = %dest.display(), "cloning");

        let clone = self.command(
            [
                "clone".to_string(),
                "--no-single-branch".to_string(),
                url.expose().clone(),
                dest.display().to_string(),
            ],
            self.config.timeouts.clone_secs,
        );
        let out = self.run(&clone)?;
        if !out.success() {
            let detail = out.failure_detail().replace(url.expose().as_str(), &redacted);
            return Err(clone_failed(&detail));
        }

        let fetch = self
            .command(["fetch", "--tags"], self.config.timeouts.fetch_tags_secs)
            .cwd(dest);
        let out = self.run(&fetch)?;
        if !out.success() {
            let detail = out.failure_detail().replace(url.expose().as_str(), &redacted);
            return Err(clone_failed(&detail));
        }
        Ok(())
    }

    /// Refresh every remote ref; failures are only logged
    pub fn refresh_refs(&self, repo_dir: &Path) {
        let spec = self
            .command(
                ["fetch", "--all", "--tags", "--prune"],
                self.config.timeouts.fetch_all_secs,
            )
            .cwd(repo_dir);
        match self.run(&spec) {
            Ok(out) if out.success() => {}
            Ok(out) => tracing::warn!(detail = %out.failure_detail().trim(), "git fetch --all failed"),
            Err(e) => tracing::warn!(error = %e, "git fetch --all failed"),
        }
    }

    /// Check out `version` (tag, branch or commit)
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a version that looks like an option,
    /// `VersionNotFound` with sampled refs when the checkout fails.
    pub fn checkout(&self, repo_dir: &Path, version: &str) -> Result<()> {
        if version.trim().is_empty() || version.starts_with('-') {
            return Err(invalid_input(format!("Invalid version: {}", version)));
        }
        self.refresh_refs(repo_dir);

        let spec = self
            .command(["checkout", version], self.config.timeouts.checkout_secs)
            .cwd(repo_dir);
        let out = self.run(&spec)?;
        if out.success() {
            tracing::debug!(version, "checked out");
            return Ok(());
        }

        tracing::debug!(version, detail = %out.failure_detail().trim(), "checkout failed");
        let sample = self.config.limits.ref_sample_size;
        let tags = self.list_refs(repo_dir, &["tag", "-l"], sample);
        let branches = self.list_refs(
            repo_dir,
            &["branch", "-r", "--format=%(refname:short)"],
            sample,
        );
        Err(version_not_found(version, tags, branches))
    }

    /// Tags, newest first
    pub fn recent_tags(&self, repo_dir: &Path, max: usize) -> Vec<String> {
        self.list_refs(repo_dir, &["tag", "--sort=-creatordate"], max)
    }

    /// Remote branches, most recently committed first, without `origin/`
    pub fn recent_branches(&self, repo_dir: &Path, max: usize) -> Vec<String> {
        let listed = self.list_refs(
            repo_dir,
            &["branch", "-r", "--sort=-committerdate", "--format=%(refname:short)"],
            usize::MAX,
        );
        listed
            .into_iter()
            .filter(|b| !b.contains("HEAD") && b != "origin")
            .map(|b| b.strip_prefix("origin/").map(str::to_string).unwrap_or(b))
            .take(max)
            .collect()
    }

    /// First `max` non-empty lines of a listing; failures yield an empty list
    fn list_refs(&self, repo_dir: &Path, args: &[&str], max: usize) -> Vec<String> {
        let spec = self
            .command(args.iter().copied(), self.config.timeouts.list_refs_secs)
            .cwd(repo_dir);
        match self.run(&spec) {
            Ok(out) if out.success() => out
                .stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(max)
                .map(str::to_string)
                .collect(),
            Ok(_) | Err(_) => {
                tracing::debug!(args = ?args, "ref listing failed");
                Vec::new()
            }
        }
    }
}
