//! Shared types for Crab Sim
//!
//! Domain models exchanged between the simulator and the remote system of
//! record, minor-unit money helpers and the unified error codes.

pub mod error;
pub mod models;
pub mod money;

// Re-exports
pub use error::{ErrorCategory, ErrorCode};
pub use money::{Cents, Percent};
pub use serde::{Deserialize, Serialize};
