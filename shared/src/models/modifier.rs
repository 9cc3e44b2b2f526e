//! Modifier Group Model

use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Modifier group entity (e.g. "Temperature", "Add-ons")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierGroup {
    pub id: String,
    pub name: String,
    /// Modifiers belonging to this group (embedded in the recorded snapshot)
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

/// Single modifier option with its price delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Cents,
    #[serde(default)]
    pub modifier_group_id: String,
}

/// Create modifier group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroupCreate {
    pub name: String,
}

/// Create modifier payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierCreate {
    pub modifier_group_id: String,
    pub name: String,
    pub price: Cents,
}
