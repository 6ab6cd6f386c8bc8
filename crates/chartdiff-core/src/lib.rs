//! chartdiff core - comparison model and pure transforms
//!
//! This crate holds everything about a chart comparison that does not touch
//! the filesystem or spawn processes:
//! - the shared diff model (resource identity, changes, structured diff, risk signals)
//! - the structured manifest differ and the plain-text fallbacks
//! - the diff normalizer that always yields a structured diff
//! - the risk classifier producing an impact summary and verdict
//! - the error and logging facilities shared by every crate in the workspace

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod normalize;
pub mod report;
pub mod risk;

pub use chartdiff_core_types as core_types;

// Re-export commonly used types
pub use diff::{DiffOptions, ManifestDiffer, SemanticDiffer};
pub use errors::{ChartDiffError, Diagnostics, ErrorReport, ExError, ExErrorKind, Result};
pub use model::{ImpactSummary, ResourceDiff, StructuredDiff};
pub use normalize::{normalize, parse_plain_diff, DiffSources};
pub use report::render_impact_report;
pub use risk::assess_risk;
