//! Error helpers for the render pipeline
//!
//! Every helper returns the canonical `ExError` so the boundary macros can
//! log kind and code uniformly.

use chartdiff_core::errors::{Diagnostics, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Longest tool output carried in diagnostics
const TOOL_OUTPUT_LIMIT: usize = 4000;

pub fn invalid_input(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("validate_request")
        .with_message(message)
}

pub fn config_error(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(message)
}

/// Clone or tag fetch failed
pub fn clone_failed(detail: &str) -> ExError {
    ExError::new(ExErrorKind::RepositoryClone)
        .with_op("clone_repository")
        .with_message(format!("Failed to clone repository: {}", first_line(detail)))
        .with_diagnostics(tool_output(detail))
}

/// Checkout failed; carries bounded samples of what does exist
pub fn version_not_found(version: &str, tags: Vec<String>, branches: Vec<String>) -> ExError {
    let message = format!(
        "Version/tag/branch \"{}\" not found in the repository.\nAvailable tags (sample): {}\nAvailable branches (sample): {}\nPlease verify that the version exists in the repository.",
        version,
        sample(&tags),
        sample(&branches),
    );
    ExError::new(ExErrorKind::VersionNotFound)
        .with_op("checkout_version")
        .with_version(version)
        .with_message(message)
        .with_diagnostics(Diagnostics {
            available_tags: tags,
            available_branches: branches,
            ..Diagnostics::default()
        })
}

/// Dependency build failed on the attempt that must succeed
pub fn dependency_failed(version: &str, detail: &str) -> ExError {
    let hint = if detail.to_lowercase().contains("repository") {
        "Required Helm repositories may not be accessible or properly configured. Please check that all repository URLs in Chart.yaml are valid and accessible."
    } else {
        "Please ensure Helm can access chart repositories and all dependencies are available."
    };
    ExError::new(ExErrorKind::DependencyResolution)
        .with_op("build_dependencies")
        .with_version(version)
        .with_message(format!(
            "Failed to build chart dependencies: {}. {}",
            first_line(detail),
            hint
        ))
        .with_diagnostics(tool_output(detail))
}

pub fn render_failed(version: &str, stderr: &str) -> ExError {
    ExError::new(ExErrorKind::TemplateRender)
        .with_op("render_template")
        .with_version(version)
        .with_message(format!("Helm template error: {}", stderr.trim()))
        .with_diagnostics(tool_output(stderr))
}

/// Primary differ failure, recovered by the plain diff chain
pub fn diff_failed(detail: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::DiffComputation)
        .with_op("compute_diff")
        .with_message(detail)
}

fn sample(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn first_line(detail: &str) -> &str {
    detail
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
}

fn tool_output(detail: &str) -> Diagnostics {
    let trimmed = detail.trim();
    if trimmed.is_empty() {
        return Diagnostics::default();
    }
    let mut end = trimmed.len().min(TOOL_OUTPUT_LIMIT);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    Diagnostics {
        tool_output: Some(trimmed[..end].to_string()),
        ..Diagnostics::default()
    }
}
