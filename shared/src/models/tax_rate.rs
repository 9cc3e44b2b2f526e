//! Tax Rate Model

use serde::{Deserialize, Serialize};

use crate::money::Percent;

/// Tax rate entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: String,
    pub name: String,
    /// Whole percent (8 = 8%)
    pub rate: Percent,
    /// Default rates are applied to every order
    #[serde(default)]
    pub is_default: bool,
}

/// Create tax rate payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRateCreate {
    pub name: String,
    pub rate: Percent,
    pub is_default: bool,
}
