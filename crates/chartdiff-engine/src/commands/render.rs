//! Render one chart at one version.

#![allow(clippy::result_large_err)]

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::pipeline::{self, Toolchain};
use crate::process::{CancelToken, CommandRunner};
use crate::request::{ChartSource, ValuesOverlay};
use chartdiff_core::model::SourceMetadata;
use chartdiff_core::{log_op_end, log_op_error, log_op_start};
use chartdiff_core_types::{redact_userinfo, RequestContext, Sensitive};
use chartdiff_store::{Side, Workspace};
use serde::{Deserialize, Serialize};

/// Rendered multi-document manifest stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedManifests {
    pub source: SourceMetadata,
    pub manifests: String,
}

/// Clone, check out, extract, resolve dependencies and render
///
/// The scratch workspace is removed before returning, on success and on
/// error.
///
/// ## Errors
///
/// - `InvalidInput`: malformed source or missing values file
/// - `RepositoryClone`, `VersionNotFound`, `ChartPathNotFound`
/// - `DependencyResolution`, `TemplateRender`
/// - `Timeout`, `OutputLimitExceeded`, `ToolUnavailable`
pub fn render_chart(
    source: &ChartSource,
    values: &ValuesOverlay,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<RenderedManifests> {
    log_op_start!(
        "render_chart",
        request_id = %ctx.request_id,
        repository = %redact_userinfo(&source.repository),
        version = %source.version
    );
    let start = std::time::Instant::now();

    let result = render_chart_impl(source, values, ctx, runner, config).map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            "render_chart",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "render_chart",
        duration_ms = start.elapsed().as_millis() as u64,
        bytes = result.manifests.len()
    );
    Ok(result)
}

fn render_chart_impl(
    source: &ChartSource,
    values: &ValuesOverlay,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<RenderedManifests> {
    source.validate()?;
    values.validate()?;

    let workspace =
        Workspace::create(&config.work_root, &ctx.request_id)?.keep_on_drop(config.keep_workspace);
    let cancel = CancelToken::new();
    let tools = Toolchain::new(runner, config, &cancel);

    tools
        .git()
        .clone_repository(&Sensitive::new(source.repository.clone()), &workspace.repo_dir())?;
    let mut prepared = pipeline::prepare(
        &tools,
        &workspace,
        Side::Left,
        &source.chart_path,
        &source.version,
    )?;
    let resolved = pipeline::resolve_values(&workspace, values)?;
    let manifests = pipeline::finish(&tools, &mut prepared, resolved.path.as_deref())?;

    Ok(RenderedManifests {
        source: pipeline::source_metadata(&source.chart_path, &source.version, &resolved),
        manifests,
    })
}
