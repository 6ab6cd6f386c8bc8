//! chartdiff-store: on-disk side of a comparison
//!
//! Provides:
//! - A scratch [`Workspace`] per comparison, removed on drop
//! - Chart discovery, extraction and `Chart.yaml` dependency parsing
//! - Atomic file writes for reports

pub mod atomic;
pub mod chart;
pub mod errors;
pub mod workspace;

pub use atomic::atomic_write;
pub use chart::{discover_charts, extract_chart, resolve_in_checkout, ChartDescriptor};
pub use errors::Result;
pub use workspace::{Side, Workspace};
