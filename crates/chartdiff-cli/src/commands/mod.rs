//! Subcommand implementations

use chartdiff_store::atomic_write;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

pub mod classify;
pub mod compare;
pub mod normalize;
pub mod versions;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown report
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Pipeline configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}

/// Print or atomically write the rendered result
pub fn emit(content: &str, global: &GlobalOpts) -> CommandResult {
    match &global.output {
        Some(path) => {
            let mut bytes = content.as_bytes().to_vec();
            if !content.ends_with('\n') {
                bytes.push(b'\n');
            }
            atomic_write(path, &bytes)?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
