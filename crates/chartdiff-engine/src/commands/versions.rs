//! List the versions available in a chart repository.

#![allow(clippy::result_large_err)]

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::pipeline::Toolchain;
use crate::process::{CancelToken, CommandRunner};
use crate::request::validate_repository;
use chartdiff_core::{log_op_end, log_op_error, log_op_start};
use chartdiff_core_types::{redact_userinfo, RequestContext, Sensitive};
use chartdiff_store::Workspace;
use serde::{Deserialize, Serialize};

/// Tags newest first and remote branches most recently committed first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionListing {
    pub tags: Vec<String>,
    pub branches: Vec<String>,
}

/// Clone the repository and list its refs
///
/// ## Errors
///
/// - `InvalidInput`: repository is blank or has an unsupported scheme
/// - `RepositoryClone`, `Timeout`, `ToolUnavailable`
pub fn list_versions(
    repository: &str,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<VersionListing> {
    log_op_start!(
        "list_versions",
        request_id = %ctx.request_id,
        repository = %redact_userinfo(repository)
    );
    let start = std::time::Instant::now();

    let result = list_versions_impl(repository, ctx, runner, config).map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            "list_versions",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "list_versions",
        duration_ms = start.elapsed().as_millis() as u64,
        tags = result.tags.len(),
        branches = result.branches.len()
    );
    Ok(result)
}

fn list_versions_impl(
    repository: &str,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<VersionListing> {
    validate_repository(repository)?;

    let workspace =
        Workspace::create(&config.work_root, &ctx.request_id)?.keep_on_drop(config.keep_workspace);
    let cancel = CancelToken::new();
    let tools = Toolchain::new(runner, config, &cancel);
    let git = tools.git();

    let repo_dir = workspace.repo_dir();
    git.clone_repository(&Sensitive::new(repository.trim().to_string()), &repo_dir)?;

    Ok(VersionListing {
        tags: git.recent_tags(&repo_dir, config.limits.max_listed_tags),
        branches: git.recent_branches(&repo_dir, config.limits.max_listed_branches),
    })
}
