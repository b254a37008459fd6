//! Error types for the Immich provider

use thiserror::Error;

/// Immich provider errors
#[derive(Error, Debug)]
pub enum ImmichError {
    /// Transport-level failure (connection, TLS, timeout)
    #[error("Immich call {endpoint} failed: {cause}")]
    CallFailed { endpoint: String, cause: String },

    /// API request completed with an error status
    #[error("Immich API error on {endpoint} (status {status_code}): {message}")]
    ApiError {
        endpoint: String,
        status_code: u16,
        message: String,
    },

    /// Failed to parse an API response
    #[error("Failed to parse Immich response from {endpoint}: {cause}")]
    ParseError { endpoint: String, cause: String },
}

/// Result type for Immich operations
pub type Result<T> = std::result::Result<T, ImmichError>;

impl From<ImmichError> for bridge_traits::error::BridgeError {
    fn from(error: ImmichError) -> Self {
        match error {
            ImmichError::CallFailed { endpoint, cause } => {
                bridge_traits::error::BridgeError::CallFailed { endpoint, cause }
            }
            ImmichError::ApiError {
                endpoint,
                status_code,
                message,
            } => bridge_traits::error::BridgeError::CallFailed {
                endpoint,
                cause: format!("status {}: {}", status_code, message),
            },
            ImmichError::ParseError { endpoint, cause } => {
                bridge_traits::error::BridgeError::CallFailed { endpoint, cause }
            }
        }
    }
}
