//! Error types for the service crate.

use thiserror::Error;

use crate::record::JobId;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The request is malformed or names an implementation that cannot be
    /// loaded. Client-visible.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No record exists for the id.
    #[error("Record {0} not found")]
    RecordNotFound(JobId),

    /// A second completion was attempted for the same record.
    #[error("Record {0} is already complete")]
    AlreadyComplete(JobId),

    /// Target resolution or execution failed.
    #[error(transparent)]
    Hal(#[from] skinfaxi_hal::HalError),

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure in the file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unexpected internal failure.
    #[error("Internal failure: {0}")]
    Internal(String),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
