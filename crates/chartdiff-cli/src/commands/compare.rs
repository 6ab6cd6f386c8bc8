//! `chartdiff compare`

use super::{emit, to_json, CommandResult, GlobalOpts, OutputFormat};
use chartdiff_core_types::RequestContext;
use chartdiff_core::render_impact_report;
use chartdiff_engine::{compare_versions, CompareRequest, PipelineConfig, SystemRunner};
use clap::Args;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Git URL of the chart repository (https://, http:// or git@)
    #[arg(long)]
    pub repository: String,

    /// Chart directory inside the repository
    #[arg(long)]
    pub chart_path: String,

    /// Left-hand tag, branch or commit
    #[arg(long)]
    pub version1: String,

    /// Right-hand tag, branch or commit
    #[arg(long)]
    pub version2: String,

    /// Values file, relative to the repository root
    #[arg(long, conflicts_with = "values_content")]
    pub values_file: Option<String>,

    /// Inline values YAML
    #[arg(long)]
    pub values_content: Option<String>,

    /// Ignore label and annotation changes
    #[arg(long)]
    pub ignore_labels: bool,
}

impl From<CompareArgs> for CompareRequest {
    fn from(args: CompareArgs) -> Self {
        CompareRequest {
            repository: args.repository,
            chart_path: args.chart_path,
            version1: args.version1,
            version2: args.version2,
            values_file: args.values_file,
            values_content: args.values_content,
            ignore_labels: args.ignore_labels,
        }
    }
}

pub fn execute(args: CompareArgs, global: &GlobalOpts) -> CommandResult {
    let config = PipelineConfig::load(global.config_path())?;
    let request = CompareRequest::from(args);
    let ctx = RequestContext::new();

    let result = compare_versions(&request, &ctx, &SystemRunner, &config)?;

    let rendered = match global.format {
        OutputFormat::Json => to_json(&result)?,
        OutputFormat::Text => {
            render_impact_report(&result.structured_diff, &result.impact_summary)
        }
    };
    emit(&rendered, global)
}
