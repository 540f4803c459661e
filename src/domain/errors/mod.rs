// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed timestamp or list entry
    #[error("Invalid format: '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },

    /// Requested span is empty, reversed or past the end of the source
    #[error("Range out of bounds: {reason}")]
    RangeOutOfBounds { reason: String },

    /// Crop rectangle degenerates or leaves the source frame
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Dimension/duration query failed
    #[error("Probe failed for {path}: {diagnostic}")]
    ProbeFailed { path: String, diagnostic: String },

    /// Engine exited non-zero or produced no output
    #[error("Encode failed for {output}: {diagnostic}")]
    EncodeFailed { output: String, diagnostic: String },

    /// Resize stage of the stack pipeline failed
    #[error("Resize failed for {source_label} source: {diagnostic}")]
    ResizeFailed {
        source_label: String,
        diagnostic: String,
    },

    /// Composite stage of the stack pipeline failed
    #[error("Composite failed: {diagnostic}")]
    CompositeFailed { diagnostic: String },

    /// Multi-item operation where some items failed
    #[error("{operation} failed for: {}", failed.join(", "))]
    PartialFailure {
        operation: String,
        failed: Vec<String>,
    },

    /// Invalid arguments or configuration values
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// Job was aborted by its caller
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

impl DomainError {
    /// Shorthand for a timestamp parse failure
    pub fn invalid_format(input: &str, reason: impl Into<String>) -> Self {
        DomainError::InvalidFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a range violation
    pub fn out_of_bounds(reason: impl Into<String>) -> Self {
        DomainError::RangeOutOfBounds {
            reason: reason.into(),
        }
    }

    /// True for errors raised before any engine process is spawned
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidFormat { .. }
                | DomainError::RangeOutOfBounds { .. }
                | DomainError::InvalidGeometry(_)
                | DomainError::BadArgs(_)
        )
    }
}

/// Result alias used across the crate
pub type DomainResult<T> = Result<T, DomainError>;
