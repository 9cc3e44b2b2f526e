//! Employee Model

use serde::{Deserialize, Serialize};

/// Staff member entity
///
/// Created by reconciliation; referenced (never owned) by the shift scheduler
/// and the order builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub role_id: Option<String>,
    pub pin: String,
}
