//! Error types for the IonQ adapter.

use thiserror::Error;

use skinfaxi_hal::HalError;

/// Result type for IonQ operations.
pub type IonqResult<T> = Result<T, IonqError>;

/// Errors that can occur when talking to the IonQ cloud.
#[derive(Debug, Error)]
pub enum IonqError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("IonQ API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Authentication was rejected.
    #[error("IonQ authentication failed: {0}")]
    Unauthorized(String),

    /// The referenced job is unknown to the API.
    #[error("IonQ job not found: {0}")]
    JobNotFound(String),

    /// A submitted job ended in failure.
    #[error("IonQ job failed: {0}")]
    JobFailed(String),

    /// A gate survived translation that the API cannot express.
    #[error("Unsupported gate for IonQ: {0}")]
    UnsupportedGate(String),

    /// Gave up waiting for a job to finish.
    #[error("Timed out waiting for IonQ job {0}")]
    Timeout(String),
}

impl From<IonqError> for HalError {
    fn from(e: IonqError) -> Self {
        match e {
            IonqError::Unauthorized(msg) => HalError::AuthenticationFailed(msg),
            IonqError::JobNotFound(id) => HalError::JobNotFound(id),
            IonqError::JobFailed(msg) => HalError::JobFailed(msg),
            IonqError::UnsupportedGate(name) => HalError::InvalidCircuit(name),
            IonqError::Timeout(id) => HalError::Timeout(id),
            IonqError::Http(e) => HalError::Network(e),
            other => HalError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hal_conversions() {
        let hal: HalError = IonqError::JobNotFound("j-1".into()).into();
        assert!(matches!(hal, HalError::JobNotFound(id) if id == "j-1"));

        let hal: HalError = IonqError::Unauthorized("bad key".into()).into();
        assert!(matches!(hal, HalError::AuthenticationFailed(_)));

        let hal: HalError = IonqError::UnsupportedGate("ccx".into()).into();
        assert!(matches!(hal, HalError::InvalidCircuit(_)));
    }
}
