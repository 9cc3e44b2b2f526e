//! Shift Model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Shift record - one employee's work shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub employee_id: String,
    pub clock_in: NaiveDateTime,
    /// None while the shift is still open
    #[serde(default)]
    pub clock_out: Option<NaiveDateTime>,
}

impl Shift {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

/// Open shift payload (clock in)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCreate {
    pub employee_id: String,
    pub clock_in: NaiveDateTime,
}

/// Close shift payload (clock out)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftClose {
    pub clock_out: NaiveDateTime,
}
