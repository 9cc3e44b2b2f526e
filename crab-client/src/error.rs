//! Gateway error types

use shared::ErrorCode;
use thiserror::Error;

/// Gateway error type
///
/// | Variant | Meaning | Caller policy |
/// |---------|---------|---------------|
/// | `NotFound` | referenced entity absent | create (reconcile) / skip (orders) |
/// | `Validation` | payload rejected | log, skip the unit |
/// | `Transient` | 5xx / network | absence during detection, next run retries |
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload rejected by the remote side
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote side temporarily unavailable
    #[error("Transient gateway error: {0}")]
    Transient(String),

    /// Response could not be interpreted
    #[error("Unexpected response: {0}")]
    Unexpected(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether a later run may succeed without changing the request
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transient(_) | GatewayError::Http(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    /// Unified error code for structured logs
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::NotFound(_) => ErrorCode::NotFound,
            GatewayError::Validation(_) => ErrorCode::ValidationFailed,
            GatewayError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            GatewayError::Http(_) | GatewayError::Transient(_) => ErrorCode::NetworkError,
            GatewayError::Unexpected(_) | GatewayError::Serialization(_) => ErrorCode::InvalidRequest,
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
