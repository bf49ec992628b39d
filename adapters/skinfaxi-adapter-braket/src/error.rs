//! Error types for the Braket adapter.

use thiserror::Error;

use skinfaxi_hal::HalError;

/// Result type for Braket operations.
pub type BraketResult<T> = Result<T, BraketError>;

/// Errors that can occur when using AWS Braket.
#[derive(Debug, Error)]
pub enum BraketError {
    /// Access-key credentials were not supplied.
    #[error("AWS access-key credentials are required for the Braket provider")]
    MissingCredentials,

    /// Braket API failure.
    #[error("Braket API error: {0}")]
    BraketApi(String),

    /// S3 failure while fetching task results.
    #[error("S3 error: {0}")]
    S3(String),

    /// The quantum task ended in failure.
    #[error("Braket task failed: {0}")]
    TaskFailed(String),

    /// The quantum task was cancelled.
    #[error("Braket task cancelled: {0}")]
    TaskCancelled(String),

    /// A gate survived translation that the wire format cannot express.
    #[error("Unsupported operation for Braket: {0}")]
    UnsupportedGate(String),

    /// The results object could not be interpreted.
    #[error("Failed to parse task result: {0}")]
    ResultParse(String),

    /// Gave up waiting for the task.
    #[error("Timed out waiting for Braket task {0}")]
    Timeout(String),

    /// JSON decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BraketError> for HalError {
    fn from(e: BraketError) -> Self {
        match e {
            BraketError::MissingCredentials => HalError::AuthenticationFailed(e.to_string()),
            BraketError::TaskFailed(msg) => HalError::JobFailed(msg),
            BraketError::TaskCancelled(msg) => HalError::JobFailed(msg),
            BraketError::UnsupportedGate(name) => HalError::InvalidCircuit(name),
            BraketError::Timeout(id) => HalError::Timeout(id),
            other => HalError::Backend(other.to_string()),
        }
    }
}
