//! `chartdiff versions`

use super::{emit, to_json, CommandResult, GlobalOpts, OutputFormat};
use chartdiff_core_types::RequestContext;
use chartdiff_engine::{list_versions, PipelineConfig, SystemRunner};
use clap::Args;

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Git URL of the chart repository
    #[arg(long)]
    pub repository: String,
}

pub fn execute(args: VersionsArgs, global: &GlobalOpts) -> CommandResult {
    let config = PipelineConfig::load(global.config_path())?;
    let listing = list_versions(&args.repository, &RequestContext::new(), &SystemRunner, &config)?;

    let rendered = match global.format {
        OutputFormat::Json => to_json(&listing)?,
        OutputFormat::Text => {
            let mut out = String::from("Tags:\n");
            for tag in &listing.tags {
                out.push_str(&format!("  {}\n", tag));
            }
            out.push_str("Branches:\n");
            for branch in &listing.branches {
                out.push_str(&format!("  {}\n", branch));
            }
            out.trim_end().to_string()
        }
    };
    emit(&rendered, global)
}
