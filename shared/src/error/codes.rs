//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog / reconciliation errors
//! - 7xxx: Table / reservation errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so they serialize compactly into log fields and
/// step payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order total could not be computed or persisted
    OrderValuationFailed = 4002,
    /// Discount or service charge has neither percentage nor amount
    MalformedAdjustment = 4003,
    /// Line item could not be added
    LineItemFailed = 4004,
    /// Order could not be opened remotely
    OrderCreateFailed = 4005,

    // ==================== 5xxx: Payment ====================
    /// Payment capture failed
    PaymentFailed = 5001,
    /// Tip could not be attached
    TipFailed = 5002,
    /// Refund creation failed
    RefundFailed = 5004,

    // ==================== 6xxx: Catalog ====================
    /// A reconciliation step failed entirely
    ReconciliationFailed = 6001,
    /// Remote existence could not be determined
    DetectionUnknown = 6002,
    /// A reference entity could not be created
    EntityCreateFailed = 6003,

    // ==================== 7xxx: Table / Reservation ====================
    /// Reservation could not be created or updated
    ReservationFailed = 7001,
    /// Illegal reservation status transition
    InvalidReservationTransition = 7002,

    // ==================== 8xxx: Employee ====================
    /// Shift could not be opened or closed
    ShiftFailed = 8001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Local state store error
    StorageError = 9002,
    /// Network error talking to the remote system
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Order
            ErrorCode::OrderValuationFailed => "Order total could not be finalized",
            ErrorCode::MalformedAdjustment => "Adjustment has neither percentage nor amount",
            ErrorCode::LineItemFailed => "Line item could not be added",
            ErrorCode::OrderCreateFailed => "Order could not be opened",

            // Payment
            ErrorCode::PaymentFailed => "Payment capture failed",
            ErrorCode::TipFailed => "Tip could not be attached",
            ErrorCode::RefundFailed => "Refund could not be created",

            // Catalog
            ErrorCode::ReconciliationFailed => "Reconciliation step failed",
            ErrorCode::DetectionUnknown => "Remote state could not be determined",
            ErrorCode::EntityCreateFailed => "Reference entity could not be created",

            // Table / Reservation
            ErrorCode::ReservationFailed => "Reservation operation failed",
            ErrorCode::InvalidReservationTransition => "Illegal reservation status transition",

            // Employee
            ErrorCode::ShiftFailed => "Shift operation failed",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageError => "State store error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Order
            4002 => Ok(ErrorCode::OrderValuationFailed),
            4003 => Ok(ErrorCode::MalformedAdjustment),
            4004 => Ok(ErrorCode::LineItemFailed),
            4005 => Ok(ErrorCode::OrderCreateFailed),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::TipFailed),
            5004 => Ok(ErrorCode::RefundFailed),

            // Catalog
            6001 => Ok(ErrorCode::ReconciliationFailed),
            6002 => Ok(ErrorCode::DetectionUnknown),
            6003 => Ok(ErrorCode::EntityCreateFailed),

            // Table / Reservation
            7001 => Ok(ErrorCode::ReservationFailed),
            7002 => Ok(ErrorCode::InvalidReservationTransition),

            // Employee
            8001 => Ok(ErrorCode::ShiftFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::OrderValuationFailed.code(), 4002);
        assert_eq!(ErrorCode::RefundFailed.code(), 5004);
        assert_eq!(ErrorCode::ReconciliationFailed.code(), 6001);
        assert_eq!(ErrorCode::InvalidReservationTransition.code(), 7002);
        assert_eq!(ErrorCode::ShiftFailed.code(), 8001);
        assert_eq!(ErrorCode::StorageError.code(), 9002);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(ErrorCode::try_from(4003), Ok(ErrorCode::MalformedAdjustment));
        assert_eq!(ErrorCode::try_from(6002), Ok(ErrorCode::DetectionUnknown));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(5003), Err(InvalidErrorCode(5003)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::TipFailed).unwrap();
        assert_eq!(json, "5002");

        let code: ErrorCode = serde_json::from_str("9005").unwrap();
        assert_eq!(code, ErrorCode::ConfigError);

        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(ErrorCode::PaymentFailed.to_string(), "5001");
        assert_eq!(ErrorCode::PaymentFailed.message(), "Payment capture failed");
    }
}
