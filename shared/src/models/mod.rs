//! Data models
//!
//! Shared between the simulator and the remote gateway. All ids are opaque
//! strings assigned by the remote system; all money is `i64` minor units.

pub mod category;
pub mod customer;
pub mod dining_table;
pub mod discount;
pub mod employee;
pub mod menu_item;
pub mod modifier;
pub mod order;
pub mod payment;
pub mod report;
pub mod reservation;
pub mod role;
pub mod shift;
pub mod tax_rate;

// Re-exports
pub use category::*;
pub use customer::*;
pub use dining_table::*;
pub use discount::*;
pub use employee::*;
pub use menu_item::*;
pub use modifier::*;
pub use order::*;
pub use payment::*;
pub use report::*;
pub use reservation::*;
pub use role::*;
pub use shift::*;
pub use tax_rate::*;
