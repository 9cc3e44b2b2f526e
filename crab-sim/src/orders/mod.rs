//! Order Building Module
//!
//! Builds the day's two order streams against the remote system:
//!
//! - **walk-in**: random employee, table, optional customer, 1..N line items
//! - **reservation**: one order per seated reservation with a customer
//!
//! # Data Flow
//!
//! ```text
//! create order → line items → modifications → discount / service charge
//!       ↓
//!  finalize (order_money::valuate → update total)
//!       ↓
//!  void (walk-in, optional) / reservation COMPLETED
//! ```
//!
//! Each remote call is its own unit of work: a failed line item is skipped,
//! a failed finalization keeps the order with `total = None`.

pub mod builder;

pub use builder::OrderBuilder;

use serde::{Deserialize, Serialize};
use shared::models::{Order, PhaseCounter};

/// Orders produced by one stream, with their counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBatch {
    pub orders: Vec<Order>,
    /// Order creation
    pub created: PhaseCounter,
    /// Line item creation
    pub line_items: PhaseCounter,
    /// Orders kept without a total
    pub unfinalized: u32,
    pub voided: u32,
}

impl OrderBatch {
    pub fn merge(&mut self, other: OrderBatch) {
        self.orders.extend(other.orders);
        self.created.merge(other.created);
        self.line_items.merge(other.line_items);
        self.unfinalized += other.unfinalized;
        self.voided += other.voided;
    }
}
