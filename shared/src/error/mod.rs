//! Unified error codes for Crab Sim
//!
//! Error codes are attached to structured log events so that a failed unit of
//! work can be classified without parsing messages.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Table / reservation errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorCategory, ErrorCode};
//!
//! let code = ErrorCode::RefundFailed;
//! assert_eq!(code.code(), 5004);
//! assert_eq!(code.category(), ErrorCategory::Payment);
//! ```

mod category;
mod codes;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
