use chartdiff_core_types::RequestId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the canonical error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by a comparison maps to exactly one kind. Each kind
/// has a stable code for programmatic handling and a stable name used in the
/// outbound error object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,

    // Render pipeline stages
    RepositoryClone,
    VersionNotFound,
    ChartPathNotFound,
    DependencyResolution,
    TemplateRender,

    // Diffing
    /// The primary differ could not produce a structured diff (recovered by fallback)
    DiffComputation,
    /// A structured diff or manifest document could not be decoded
    InvalidManifest,

    // Subprocess bounds
    Timeout,
    OutputLimitExceeded,
    Cancelled,
    ToolUnavailable,

    // Integration
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::RepositoryClone => "ERR_REPOSITORY_CLONE",
            ExErrorKind::VersionNotFound => "ERR_VERSION_NOT_FOUND",
            ExErrorKind::ChartPathNotFound => "ERR_CHART_PATH_NOT_FOUND",
            ExErrorKind::DependencyResolution => "ERR_DEPENDENCY_RESOLUTION",
            ExErrorKind::TemplateRender => "ERR_TEMPLATE_RENDER",
            ExErrorKind::DiffComputation => "ERR_DIFF_COMPUTATION",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::OutputLimitExceeded => "ERR_OUTPUT_LIMIT_EXCEEDED",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::ToolUnavailable => "ERR_TOOL_UNAVAILABLE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Get the stable type name used in outbound error objects
    pub fn name(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "InvalidInputError",
            ExErrorKind::RepositoryClone => "RepositoryCloneError",
            ExErrorKind::VersionNotFound => "VersionNotFoundError",
            ExErrorKind::ChartPathNotFound => "ChartPathNotFoundError",
            ExErrorKind::DependencyResolution => "DependencyResolutionError",
            ExErrorKind::TemplateRender => "TemplateRenderError",
            ExErrorKind::DiffComputation => "DiffComputationError",
            ExErrorKind::InvalidManifest => "InvalidManifestError",
            ExErrorKind::Timeout => "TimeoutError",
            ExErrorKind::OutputLimitExceeded => "OutputLimitExceededError",
            ExErrorKind::Cancelled => "CancelledError",
            ExErrorKind::ToolUnavailable => "ToolUnavailableError",
            ExErrorKind::Io => "IoError",
            ExErrorKind::Serialization => "SerializationError",
            ExErrorKind::Config => "ConfigError",
            ExErrorKind::Internal => "InternalError",
        }
    }

    /// Whether a caller may recover from this kind without aborting the comparison
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExErrorKind::DiffComputation)
    }
}

/// Actionable context attached to an error
///
/// Only the fields relevant to the failing stage are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Bounded sample of tags present in the repository
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_tags: Vec<String>,
    /// Bounded sample of remote branches present in the repository
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_branches: Vec<String>,
    /// Chart directories discovered in the checkout
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chart_candidates: Vec<String>,
    /// Trimmed diagnostic output of the failing tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.available_tags.is_empty()
            && self.available_branches.is_empty()
            && self.chart_candidates.is_empty()
            && self.tool_output.is_none()
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    version: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    diagnostics: Option<Diagnostics>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            version: None,
            request_id: None,
            message: String::new(),
            diagnostics: None,
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the chart version (ref) the failing stage was working on
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Project this error into the outbound `{kind, message, diagnostics?}` object
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind.name().to_string(),
            code: self.code().to_string(),
            message: self.message.clone(),
            diagnostics: self.diagnostics.clone().filter(|d| !d.is_empty()),
        }
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.kind.name())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(version) = &self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(diag) = &self.diagnostics {
            if !diag.available_tags.is_empty() || !diag.available_branches.is_empty() {
                write!(
                    f,
                    "\nAvailable tags (sample): {}\nAvailable branches (sample): {}",
                    join_or_none(&diag.available_tags),
                    join_or_none(&diag.available_branches)
                )?;
            }
            if !diag.chart_candidates.is_empty() {
                write!(f, "\nCharts found in repository:")?;
                for candidate in &diag.chart_candidates {
                    write!(f, "\n  - {}", candidate)?;
                }
            }
        }
        Ok(())
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Outbound error object handed to the API or presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

// ========== End Error Facility ==========

/// Typed failures raised below the pipeline boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartDiffError {
    /// A subprocess ran past its deadline and was killed
    #[error("{program} timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    /// A subprocess wrote more than its output budget and was killed
    #[error("{program} exceeded its output limit of {limit_bytes} bytes")]
    OutputLimit { program: String, limit_bytes: usize },

    /// A sibling stage failed and this subprocess was terminated
    #[error("{program} was cancelled")]
    Cancelled { program: String },

    /// The tool binary could not be started
    #[error("{program} is not available: {reason}")]
    ToolUnavailable { program: String, reason: String },

    /// No document in a manifest stream could be decoded
    #[error("Manifest stream for {side} could not be parsed: {reason}")]
    UnparseableManifest { side: String, reason: String },

    /// JSON encoding/decoding failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ChartDiffError> for ExError {
    fn from(err: ChartDiffError) -> Self {
        let message = err.to_string();
        match err {
            ChartDiffError::Timeout { program, .. } => ExError::new(ExErrorKind::Timeout)
                .with_op(program)
                .with_message(message),
            ChartDiffError::OutputLimit { program, .. } => {
                ExError::new(ExErrorKind::OutputLimitExceeded)
                    .with_op(program)
                    .with_message(message)
            }
            ChartDiffError::Cancelled { program } => ExError::new(ExErrorKind::Cancelled)
                .with_op(program)
                .with_message(message),
            ChartDiffError::ToolUnavailable { program, .. } => {
                ExError::new(ExErrorKind::ToolUnavailable)
                    .with_op(program)
                    .with_message(message)
            }
            ChartDiffError::UnparseableManifest { .. } => {
                ExError::new(ExErrorKind::DiffComputation)
                    .with_op("compare_manifests")
                    .with_message(message)
            }
            ChartDiffError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            ChartDiffError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
