//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in target operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No target with this name could be resolved.
    ///
    /// Covers unknown providers, unknown devices, and failed authenticated
    /// lookups; callers translate it into their not-found surface.
    #[error("Target not found: {provider}/{device}")]
    TargetNotFound {
        /// Requested provider name.
        provider: String,
        /// Requested device name.
        device: String,
    },

    /// A credential field required by the provider is absent.
    #[error("Missing credential field '{field}' for provider {provider}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// The missing parameter key.
        field: String,
    },

    /// Authentication with the provider failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend rejected or lost a submitted job.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// A submitted job finished unsuccessfully.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// The backend does not know the referenced job.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The circuit cannot be executed on this target.
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// The requested shot count is out of range for the target.
    #[error("Invalid shots: {0}")]
    InvalidShots(String),

    /// Gave up waiting for a job to finish.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Network error talking to a hosted provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
