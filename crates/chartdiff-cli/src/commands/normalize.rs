//! `chartdiff normalize`

use super::{emit, to_json, CommandResult, GlobalOpts, OutputFormat};
use chartdiff_core::{assess_risk, normalize, render_impact_report, DiffSources, StructuredDiff};
use chartdiff_engine::errors::invalid_input;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Plain line-oriented diff (dyff or `- `/`+ ` lines)
    #[arg(required_unless_present = "structured")]
    pub plain: Option<PathBuf>,

    /// Pre-built structured diff JSON; used as-is instead of the plain diff
    #[arg(long)]
    pub structured: Option<PathBuf>,

    /// Left-hand version recorded in the diff metadata
    #[arg(long)]
    pub v1: Option<String>,

    /// Right-hand version recorded in the diff metadata
    #[arg(long)]
    pub v2: Option<String>,
}

pub fn execute(args: NormalizeArgs, global: &GlobalOpts) -> CommandResult {
    let pinned = match &args.structured {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let diff: StructuredDiff = serde_json::from_str(&text).map_err(|e| {
                invalid_input(format!("{} is not a structured diff: {}", path.display(), e))
            })?;
            Some(diff)
        }
        None => None,
    };
    let plain = match &args.plain {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let structured = normalize(
        DiffSources {
            pinned,
            primary: None,
            plain: plain.as_deref(),
        },
        args.v1.as_deref(),
        args.v2.as_deref(),
    );

    let rendered = match (global.format, structured) {
        (OutputFormat::Json, diff) => to_json(&diff)?,
        (OutputFormat::Text, Some(diff)) => {
            let impact = assess_risk(&diff.resources);
            render_impact_report(&diff, &impact)
        }
        (OutputFormat::Text, None) => "No differences found.".to_string(),
    };
    emit(&rendered, global)
}
