//! Payment capture, tips and refunds
//!
//! - **settlement**: one payment per payable order, optional tip
//! - **refund**: full / partial refunds against captured payments

pub mod refund;
pub mod settlement;

pub use refund::{RefundBatch, RefundProcessor};
pub use settlement::{PaymentSettlement, SettlementBatch};
