use crab_client::GatewayError;
use shared::ErrorCode;
use shared::models::InvalidTransition;
use thiserror::Error;

use crate::order_money::ValuationError;
use crate::setup::StorageError;

/// Simulator error type
///
/// Only `FatalReconciliation`, `DetectionUnknown` and `Storage` abort a run;
/// everything else is caught at its unit of work and counted.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("网关错误: {0}")]
    Gateway(#[from] GatewayError),

    #[error("reconciliation step '{step}' failed: {failed} creation(s) failed and nothing exists")]
    FatalReconciliation { step: String, failed: u32 },

    #[error("cannot tell which {step} entities exist: {source}")]
    DetectionUnknown {
        step: String,
        #[source]
        source: GatewayError,
    },

    #[error("valuation error: {0}")]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),
}

impl SimError {
    /// Unified error code for structured log fields
    pub fn code(&self) -> ErrorCode {
        match self {
            SimError::Storage(_) => ErrorCode::StorageError,
            SimError::Gateway(e) => e.code(),
            SimError::FatalReconciliation { .. } => ErrorCode::ReconciliationFailed,
            SimError::DetectionUnknown { .. } => ErrorCode::DetectionUnknown,
            SimError::Valuation(_) => ErrorCode::OrderValuationFailed,
            SimError::InvalidTransition(_) => ErrorCode::InvalidReservationTransition,
            SimError::Serialization(_) => ErrorCode::InternalError,
            SimError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Code of a failed unit of work
    ///
    /// Remote and serialization failures are reported under `unit`; errors
    /// with a domain meaning of their own keep it.
    pub fn unit_code(&self, unit: ErrorCode) -> ErrorCode {
        match self {
            SimError::Gateway(_) | SimError::Serialization(_) => unit,
            other => other.code(),
        }
    }

    /// Whether re-running may succeed without changing anything
    pub fn is_retryable(&self) -> bool {
        match self {
            SimError::Gateway(e) => e.is_retryable(),
            SimError::DetectionUnknown { .. } => true,
            _ => false,
        }
    }

    /// Errors that abort the whole run instead of a single unit
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SimError::Storage(_)
                | SimError::FatalReconciliation { .. }
                | SimError::DetectionUnknown { .. }
        )
    }
}

impl From<validator::ValidationErrors> for SimError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SimError::Config(errors.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
