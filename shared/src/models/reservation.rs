//! Reservation Model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reservation lifecycle
///
/// ```text
/// PENDING ──► SEATED ──► COMPLETED
///    │
///    ├──► CANCELED
///    └──► NO_SHOW
/// ```
///
/// Transitions are one-directional; nothing returns to `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Seated,
    Completed,
    Canceled,
    NoShow,
}

impl ReservationStatus {
    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Seated) | (Pending, Canceled) | (Pending, NoShow) | (Seated, Completed)
        )
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Canceled | ReservationStatus::NoShow
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Seated => "SEATED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Canceled => "CANCELED",
            ReservationStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reservation cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ReservationStatus,
    pub to: ReservationStatus,
}

/// Reservation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub table_id: String,
    pub time: NaiveDateTime,
    pub party_size: u32,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Apply a status change, rejecting anything the lifecycle forbids
    pub fn transition(&mut self, next: ReservationStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub customer_id: Option<String>,
    pub table_id: String,
    pub time: NaiveDateTime,
    pub party_size: u32,
    pub status: ReservationStatus,
}
