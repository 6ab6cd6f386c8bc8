//! `chartdiff classify`

use super::{emit, to_json, CommandResult, GlobalOpts, OutputFormat};
use chartdiff_core::{assess_risk, render_impact_report, ResourceDiff, StructuredDiff};
use chartdiff_engine::errors::invalid_input;
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// JSON file holding a structured diff or a bare array of resource diffs
    pub diff: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiffInput {
    Structured(StructuredDiff),
    Resources(Vec<ResourceDiff>),
}

pub fn execute(args: ClassifyArgs, global: &GlobalOpts) -> CommandResult {
    let text = std::fs::read_to_string(&args.diff)?;
    let input: DiffInput = serde_json::from_str(&text).map_err(|e| {
        invalid_input(format!(
            "{} is not a structured diff: {}",
            args.diff.display(),
            e
        ))
    })?;

    let rendered = match input {
        DiffInput::Structured(diff) => {
            let impact = assess_risk(&diff.resources);
            match global.format {
                OutputFormat::Json => to_json(&impact)?,
                OutputFormat::Text => render_impact_report(&diff, &impact),
            }
        }
        DiffInput::Resources(resources) => {
            let impact = assess_risk(&resources);
            match global.format {
                OutputFormat::Json => to_json(&impact)?,
                OutputFormat::Text => format!(
                    "{} ({} changed resources, {} high, {} medium, {} low)",
                    impact.verdict.as_str(),
                    impact.total_changed_resources,
                    impact.total_high_risk,
                    impact.total_medium_risk,
                    impact.total_low_risk
                ),
            }
        }
    };
    emit(&rendered, global)
}
