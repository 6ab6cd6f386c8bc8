//! Compare two versions of a chart end to end.
//!
//! Flow: validate, clone once, prepare each side in turn, render both sides
//! concurrently, diff, normalize, classify.
//!
//! Diff selection falls through in order:
//! 1. the built-in semantic differ (when enabled)
//! 2. `dyff between` (when enabled)
//! 3. a naive line diff
//!
//! A failing differ is logged and the next one is tried; only the line
//! diff cannot fail.

#![allow(clippy::result_large_err)]

use crate::config::{PipelineConfig, Timeouts};
use crate::errors::{diff_failed, Result};
use crate::pipeline::{self, PreparedChart, Toolchain};
use crate::process::{CancelToken, CommandRunner, CommandSpec};
use crate::request::CompareRequest;
use chartdiff_core::diff::{filter_metadata_sections, line_diff};
use chartdiff_core::errors::{ExError, ExErrorKind};
use chartdiff_core::model::{ImpactSummary, InputSources, StructuredDiff};
use chartdiff_core::normalize::CONVERTED_ENGINE_VERSION;
use chartdiff_core::{
    assess_risk, log_op_end, log_op_error, log_op_start, normalize, ChartDiffError, DiffOptions,
    DiffSources, ManifestDiffer, SemanticDiffer,
};
use chartdiff_core_types::{redact_userinfo, RequestContext, Sensitive};
use chartdiff_store::{Side, Workspace};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which differ produced the structured diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffEngine {
    Semantic,
    Dyff,
    LineDiff,
}

/// Outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub request_id: String,
    pub version1: String,
    pub version2: String,
    pub engine: DiffEngine,
    /// Plain diff text when a fallback differ was used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_diff: Option<String>,
    pub structured_diff: StructuredDiff,
    pub impact_summary: ImpactSummary,
}

/// Compare `version1` and `version2` of one chart
///
/// The workspace is destroyed before returning and partial results are
/// discarded on error.
///
/// ## Errors
///
/// - `InvalidInput`: request validation failed
/// - `RepositoryClone`, `VersionNotFound`, `ChartPathNotFound`
/// - `DependencyResolution`, `TemplateRender`
/// - `Timeout`, `OutputLimitExceeded`, `ToolUnavailable`, `Io`
pub fn compare_versions(
    request: &CompareRequest,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<ComparisonResult> {
    log_op_start!(
        "compare_versions",
        request_id = %ctx.request_id,
        repository = %redact_userinfo(&request.repository),
        chart_path = %request.chart_path,
        version1 = %request.version1,
        version2 = %request.version2
    );
    let start = std::time::Instant::now();

    let result = compare_versions_impl(request, ctx, runner, config).map_err(|e| {
        let e = e.with_request_id(ctx.request_id.clone());
        log_op_error!(
            "compare_versions",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "compare_versions",
        duration_ms = start.elapsed().as_millis() as u64,
        engine = ?result.engine,
        verdict = result.impact_summary.verdict.as_str(),
        changed_resources = result.impact_summary.total_changed_resources
    );
    Ok(result)
}

fn compare_versions_impl(
    request: &CompareRequest,
    ctx: &RequestContext,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
) -> Result<ComparisonResult> {
    request.validate()?;
    let left_source = request.left();
    let right_source = request.right();

    let workspace =
        Workspace::create(&config.work_root, &ctx.request_id)?.keep_on_drop(config.keep_workspace);
    let cancel = CancelToken::new();
    let tools = Toolchain::new(runner, config, &cancel);

    tools.git().clone_repository(
        &Sensitive::new(left_source.repository.clone()),
        &workspace.repo_dir(),
    )?;

    let mut left = pipeline::prepare(
        &tools,
        &workspace,
        Side::Left,
        &left_source.chart_path,
        &left_source.version,
    )?;
    let mut right = pipeline::prepare(
        &tools,
        &workspace,
        Side::Right,
        &right_source.chart_path,
        &right_source.version,
    )?;
    let values = pipeline::resolve_values(&workspace, &request.values_overlay())?;

    let (left_manifests, right_manifests) =
        render_both(&tools, &mut left, &mut right, values.path.as_deref())?;

    let inputs = InputSources {
        left: pipeline::source_metadata(&left_source.chart_path, &left_source.version, &values),
        right: pipeline::source_metadata(&right_source.chart_path, &right_source.version, &values),
    };
    let (engine, plain_diff, mut structured_diff) = compute_diff(
        &tools,
        &workspace,
        request,
        &left_manifests,
        &right_manifests,
        &inputs,
    );
    structured_diff.metadata.compare_id = ctx.request_id.to_string();
    structured_diff.metadata.inputs = inputs;

    let impact_summary = assess_risk(&structured_diff.resources);
    Ok(ComparisonResult {
        request_id: ctx.request_id.to_string(),
        version1: left_source.version,
        version2: right_source.version,
        engine,
        plain_diff,
        structured_diff,
        impact_summary,
    })
}

/// Finish both sides concurrently; the first failure cancels the sibling
fn render_both(
    tools: &Toolchain<'_>,
    left: &mut PreparedChart,
    right: &mut PreparedChart,
    values: Option<&Path>,
) -> Result<(String, String)> {
    let tools = *tools;
    let (left_result, right_result) = std::thread::scope(|scope| {
        let left_handle = scope.spawn(move || finish_or_cancel(&tools, left, values));
        let right_handle = scope.spawn(move || finish_or_cancel(&tools, right, values));
        (joined(left_handle.join()), joined(right_handle.join()))
    });

    match (left_result, right_result) {
        (Ok(l), Ok(r)) => Ok((l, r)),
        (Err(l), Err(r)) => Err(if l.kind() == ExErrorKind::Cancelled { r } else { l }),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
    }
}

fn finish_or_cancel(
    tools: &Toolchain<'_>,
    prepared: &mut PreparedChart,
    values: Option<&Path>,
) -> Result<String> {
    pipeline::finish(tools, prepared, values).inspect_err(|e| {
        tracing::debug!(side = ?prepared.side, error = %e, "render failed, cancelling sibling");
        tools.cancel.cancel();
    })
}

fn joined(result: std::thread::Result<Result<String>>) -> Result<String> {
    result.unwrap_or_else(|_| {
        Err(ExError::from(ChartDiffError::Internal {
            message: "render worker panicked".to_string(),
        }))
    })
}

fn compute_diff(
    tools: &Toolchain<'_>,
    workspace: &Workspace,
    request: &CompareRequest,
    left: &str,
    right: &str,
    inputs: &InputSources,
) -> (DiffEngine, Option<String>, StructuredDiff) {
    let primary = if tools.config.internal_diff_enabled {
        let differ = SemanticDiffer::new(DiffOptions {
            ignore_labels: request.ignore_labels,
            ignore_annotations: request.ignore_labels,
            include_unchanged: false,
        });
        differ
            .compare(left, right, inputs)
            .inspect_err(|e| {
                tracing::warn!(
                    error = %diff_failed(e.message()),
                    "semantic diff failed, falling back to plain diff"
                )
            })
            .ok()
    } else {
        None
    };

    let (engine, plain) = match primary {
        Some(_) => (DiffEngine::Semantic, None),
        None => {
            let dyff = if tools.config.dyff_enabled {
                run_dyff(tools, workspace, left, right, request.ignore_labels)
            } else {
                None
            };
            match dyff {
                Some(text) => (DiffEngine::Dyff, Some(text)),
                None => (DiffEngine::LineDiff, Some(line_diff(left, right))),
            }
        }
    };

    let sources = DiffSources {
        primary,
        plain: plain.as_deref(),
        ..DiffSources::default()
    };
    let structured = normalize(
        sources,
        Some(request.version1.trim()),
        Some(request.version2.trim()),
    )
    .unwrap_or_else(|| StructuredDiff::empty(CONVERTED_ENGINE_VERSION, "", inputs.clone()));
    (engine, plain, structured)
}

/// `dyff between`; `None` when it is unavailable or fails
fn run_dyff(
    tools: &Toolchain<'_>,
    workspace: &Workspace,
    left: &str,
    right: &str,
    ignore_labels: bool,
) -> Option<String> {
    let left_path = workspace.root().join("left.yaml");
    let right_path = workspace.root().join("right.yaml");
    if let Err(e) = std::fs::write(&left_path, left).and_then(|()| std::fs::write(&right_path, right)) {
        tracing::warn!(error = %e, "could not stage manifests for dyff");
        return None;
    }

    let spec = CommandSpec::new(
        tools.config.tools.dyff.clone(),
        [
            "between".to_string(),
            "--omit-header".to_string(),
            left_path.display().to_string(),
            right_path.display().to_string(),
        ],
    )
    .timeout(Timeouts::of(tools.config.timeouts.dyff_secs))
    .max_output(tools.config.limits.dyff_output_bytes);

    match tools.runner.run(&spec, tools.cancel) {
        // 1 means "differences found"
        Ok(out) if out.status == Some(0) || out.status == Some(1) => Some(if ignore_labels {
            filter_metadata_sections(&out.stdout)
        } else {
            out.stdout
        }),
        Ok(out) => {
            tracing::warn!(status = ?out.status, detail = %out.failure_detail().trim(), "dyff failed, using line diff");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "dyff unavailable, using line diff");
            None
        }
    }
}
