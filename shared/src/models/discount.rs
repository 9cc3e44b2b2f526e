//! Discount Model

use serde::{Deserialize, Serialize};

use crate::money::{Cents, Percent};

/// Catalog discount entity
///
/// Exactly one of `percentage` / `amount` is expected. Fixed amounts are
/// stored as negative magnitudes (-500 = 5.00 off).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub percentage: Option<Percent>,
    #[serde(default)]
    pub amount: Option<Cents>,
}

/// Create discount payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountCreate {
    pub name: String,
    pub percentage: Option<Percent>,
    pub amount: Option<Cents>,
}
