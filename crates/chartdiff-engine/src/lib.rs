//! chartdiff-engine: render pipeline orchestration
//!
//! Coordinates git, helm and the filesystem to turn a comparison request
//! into two rendered manifest streams, then hands them to the differs and
//! the risk classifier in chartdiff-core.
//!
//! Public operations live in [`commands`]; everything they need to reach
//! the outside world goes through a [`process::CommandRunner`].

pub mod commands;
pub mod config;
pub mod dependencies;
pub mod errors;
pub mod git;
pub mod helm;
pub mod pipeline;
pub mod process;
pub mod request;

pub use commands::compare::{compare_versions, ComparisonResult, DiffEngine};
pub use commands::render::{render_chart, RenderedManifests};
pub use commands::versions::{list_versions, VersionListing};
pub use config::PipelineConfig;
pub use errors::Result;
pub use process::{CancelToken, CommandRunner, CommandSpec, ProcessOutput, SystemRunner};
pub use request::{ChartSource, CompareRequest, ValuesOverlay};
