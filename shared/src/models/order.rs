//! Order Model
//!
//! Local view of an order while it is being built. `total` stays `None` until
//! finalization succeeds; afterwards it always equals the valuation of the
//! line items, discounts, service charges and tax rates held here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::TaxRate;
use crate::money::{Cents, Percent};

/// Order state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Open,
    Voided,
}

/// Which stream produced the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    WalkIn,
    Reservation,
}

/// Modifier applied to a line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    #[serde(default)]
    pub id: Option<String>,
    pub modifier_id: String,
    pub name: String,
    /// Price delta per unit
    pub price: Cents,
}

/// Line item, owned exclusively by its order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: u32,
    #[serde(default)]
    pub modifications: Vec<Modification>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Order-level discount
///
/// `amount` is a negative magnitude (-500 = 5.00 off).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDiscount {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub percentage: Option<Percent>,
    #[serde(default)]
    pub amount: Option<Cents>,
}

/// Order-level service charge (e.g. large party gratuity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCharge {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub percentage: Option<Percent>,
    #[serde(default)]
    pub amount: Option<Cents>,
}

/// Order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub source: OrderSource,
    pub state: OrderState,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discounts: Vec<OrderDiscount>,
    #[serde(default)]
    pub service_charges: Vec<ServiceCharge>,
    #[serde(default)]
    pub tax_rates: Vec<TaxRate>,
    /// Finalized total; None until valuation has been persisted
    #[serde(default)]
    pub total: Option<Cents>,
}

impl Order {
    pub fn is_voided(&self) -> bool {
        self.state == OrderState::Voided
    }

    /// Finalized and not voided: eligible for payment
    pub fn is_payable(&self) -> bool {
        !self.is_voided() && self.total.is_some()
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub state: OrderState,
    pub source: OrderSource,
    pub created_at: NaiveDateTime,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    pub table_id: Option<String>,
    pub reservation_id: Option<String>,
}

/// Create line item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemCreate {
    pub order_id: String,
    pub item_id: String,
    pub name: String,
    pub price: Cents,
    pub quantity: u32,
    pub note: Option<String>,
}

/// Create modification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationCreate {
    pub order_id: String,
    pub line_item_id: String,
    pub modifier_id: String,
    pub name: String,
    pub price: Cents,
}

/// Create order discount / service charge payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentCreate {
    pub order_id: String,
    pub name: String,
    pub percentage: Option<Percent>,
    pub amount: Option<Cents>,
}
