//! Menu Item Model

use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Unit price in minor units
    pub price: Cents,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Modifier groups whose modifiers may be applied to this item
    #[serde(default)]
    pub modifier_group_ids: Vec<String>,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price: Cents,
    pub category_id: Option<String>,
    pub modifier_group_ids: Vec<String>,
    pub tax_rate_ids: Vec<String>,
}
