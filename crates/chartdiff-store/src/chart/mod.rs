//! Chart directory concerns: descriptor parsing, discovery and extraction.

pub mod copy;
pub mod descriptor;
pub mod discovery;

pub use copy::{extract_chart, resolve_in_checkout};
pub use descriptor::{ChartDescriptor, Dependency, LegacyRepository, CHART_FILE};
pub use discovery::discover_charts;
