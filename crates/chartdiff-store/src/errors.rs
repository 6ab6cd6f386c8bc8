//! Error handling for chartdiff-store
//!
//! Wraps chartdiff-core ExError with store-specific helpers

use chartdiff_core::errors::{Diagnostics, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a chart path error listing the charts that do exist
pub fn chart_path_not_found(chart_path: &str, version: &str, candidates: Vec<String>) -> ExError {
    let mut message = format!("Chart path not found: {} at version {}", chart_path, version);
    if candidates.is_empty() {
        message.push_str(". No charts found in repository");
    }
    ExError::new(ExErrorKind::ChartPathNotFound)
        .with_op("extract_chart")
        .with_version(version)
        .with_message(message)
        .with_diagnostics(Diagnostics {
            chart_candidates: candidates,
            ..Diagnostics::default()
        })
}

/// Create a chart descriptor read error
pub fn descriptor_error(path: &std::path::Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::DependencyResolution)
        .with_op("read_chart_descriptor")
        .with_message(format!("Failed to read {}: {}", path.display(), err))
}
