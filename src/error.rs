//! Error types for CoCorels.
//!
//! All errors in CoCorels are strongly typed using thiserror.
//! Only two failure shapes ever reach a caller of the pipeline: a
//! configuration that fails validation, and an integrity check that
//! fails. Everything else (assessor faults, signing faults) is absorbed
//! with a documented fallback.

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors raised while loading taxonomy and engine configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Trait code cannot be empty")]
    EmptyTraitCode,

    #[error("Anchor text missing or empty for trait {code}")]
    MissingAnchor {
        code: String,
    },

    #[error("Trait {code} is declared more than once")]
    DuplicateTrait {
        code: String,
    },

    #[error("Default weight {weight} for trait {code} is not finite")]
    InvalidWeight {
        code: String,
        weight: f64,
    },

    #[error("Taxonomy must declare at least one trait")]
    EmptyTaxonomy,

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors while reading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Execution errors raised by the dedicated resolver runtime.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Runtime queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Runtime worker disconnected")]
    Disconnected,

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Raised by an [`IntegrityGuard`](crate::integrity::IntegrityGuard) when
/// the platform cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Integrity check failed: {reason}")]
pub struct IntegrityError {
    /// Why verification failed.
    pub reason: String,
}

impl IntegrityError {
    /// Creates an integrity error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Raised by a [`TraitAssessor`](crate::assessor::TraitAssessor).
///
/// Never propagated past the assessment step.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Assessor unavailable: {message}")]
    Unavailable {
        message: String,
    },

    #[error("Assessor returned unparseable output: {output}")]
    Malformed {
        output: String,
    },
}

/// Raised by a [`ProvenanceSigner`](crate::provenance::ProvenanceSigner).
#[derive(Debug, Error)]
#[error("Signing failed: {message}")]
pub struct SigningError {
    /// Description of the failure.
    pub message: String,
}

/// Top-level error type for CoCorels.
#[derive(Debug, Error)]
pub enum CocorelsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Security error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CocorelsError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation or config error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is an integrity error.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
            Self::Validation(_) | Self::Config(_) | Self::Integrity(_) | Self::Internal { .. } => {
                false
            }
        }
    }
}

/// Result type alias for CoCorels operations.
pub type CocorelsResult<T> = Result<T, CocorelsError>;
