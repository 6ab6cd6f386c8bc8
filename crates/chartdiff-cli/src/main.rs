//! chartdiff CLI
//!
//! Command-line interface for comparing Helm chart versions

use chartdiff_core::logging_facility::{init, Profile};
use chartdiff_core::ExError;
use clap::{Parser, Subcommand};

mod commands;

use commands::{GlobalOpts, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "chartdiff")]
#[command(about = "chartdiff - Risk-classified comparison of Helm chart versions", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Human-readable debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render two versions of a chart and compare them
    Compare(commands::compare::CompareArgs),
    /// Classify a structured diff read from a JSON file
    Classify(commands::classify::ClassifyArgs),
    /// Convert a plain line-oriented diff into a structured diff
    Normalize(commands::normalize::NormalizeArgs),
    /// List tags and branches of a chart repository
    Versions(commands::versions::VersionsArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Production
    });

    let global = cli.global;
    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args, &global),
        Commands::Classify(args) => commands::classify::execute(args, &global),
        Commands::Normalize(args) => commands::normalize::execute(args, &global),
        Commands::Versions(args) => commands::versions::execute(args, &global),
    };

    if let Err(e) = result {
        match (global.format, e.downcast_ref::<ExError>()) {
            (OutputFormat::Json, Some(ex)) => match serde_json::to_string(&ex.to_report()) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("Error: {}", e),
            },
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}
