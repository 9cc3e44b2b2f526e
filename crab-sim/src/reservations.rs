//! Reservation generation and lifecycle
//!
//! Bookings are drawn on a 15-minute grid across the service window; status
//! changes are validated locally before the remote record is touched, so a
//! reservation can never be moved backwards.

use chrono::{NaiveDate, NaiveTime};
use crab_client::{EntityType, RemoteEntityGateway, to_payload};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::ErrorCode;
use shared::models::{Customer, DiningTable, Reservation, ReservationCreate, ReservationStatus};
use std::sync::Arc;

use crate::core::{SimResult, SimulationProfile};
use crate::utils::time::time_grid;

/// Booking slot granularity
const SLOT_MINUTES: u32 = 15;

/// First and last bookable times
const FIRST_SLOT: (u32, u32) = (11, 0);
const LAST_SLOT: (u32, u32) = (21, 0);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationOutcome {
    /// Created reservations, ordered by time
    pub reservations: Vec<Reservation>,
    pub failed: u32,
}

pub struct ReservationGenerator {
    gateway: Arc<dyn RemoteEntityGateway>,
    profile: SimulationProfile,
}

impl ReservationGenerator {
    pub fn new(gateway: Arc<dyn RemoteEntityGateway>, profile: SimulationProfile) -> Self {
        Self { gateway, profile }
    }

    /// Create the day's reservations
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        customers: &[Customer],
        tables: &[DiningTable],
        rng: &mut R,
    ) -> ReservationOutcome {
        let mut outcome = ReservationOutcome::default();
        if tables.is_empty() {
            tracing::warn!(%date, "No tables, skipping reservations");
            return outcome;
        }

        let slots = time_grid(
            date,
            NaiveTime::from_hms_opt(FIRST_SLOT.0, FIRST_SLOT.1, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(LAST_SLOT.0, LAST_SLOT.1, 0).unwrap_or(NaiveTime::MIN),
            SLOT_MINUTES,
        );

        let count = self.profile.reservations_per_day.sample(rng);
        for _ in 0..count {
            let customer = customers.choose(rng);
            let Some(table) = tables.choose(rng) else {
                break;
            };
            let Some(&time) = slots.choose(rng) else {
                break;
            };
            let party_size = rng.gen_range(1..=table.capacity.max(1));

            let create = ReservationCreate {
                customer_id: customer.map(|c| c.id.clone()),
                table_id: table.id.clone(),
                time,
                party_size,
                status: ReservationStatus::Pending,
            };

            match self.create(create).await {
                Ok(reservation) => {
                    tracing::debug!(
                        reservation_id = %reservation.id,
                        table = %table.name,
                        %time,
                        party_size,
                        "Reservation created"
                    );
                    outcome.reservations.push(reservation);
                }
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        %date,
                        code = %e.unit_code(ErrorCode::ReservationFailed),
                        cause = %e.code(),
                        error = %e,
                        "Reservation creation failed"
                    );
                }
            }
        }

        // 取消 / 未到店
        for reservation in outcome.reservations.iter_mut() {
            let roll: f64 = rng.r#gen();
            let next = if roll < self.profile.reservation_cancel_probability {
                ReservationStatus::Canceled
            } else if roll
                < self.profile.reservation_cancel_probability
                    + self.profile.reservation_no_show_probability
            {
                ReservationStatus::NoShow
            } else {
                continue;
            };
            if let Err(e) = self.transition(reservation, next).await {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    to = %next,
                    code = %e.unit_code(ErrorCode::ReservationFailed),
                    error = %e,
                    "Reservation status change failed"
                );
            }
        }

        outcome.reservations.sort_by_key(|r| r.time);
        tracing::info!(
            %date,
            created = outcome.reservations.len(),
            failed = outcome.failed,
            "Reservations generated"
        );
        outcome
    }

    async fn create(&self, create: ReservationCreate) -> SimResult<Reservation> {
        let record = self
            .gateway
            .create(EntityType::Reservation, to_payload(&create)?)
            .await?;
        Ok(Reservation {
            id: record.id,
            customer_id: create.customer_id,
            table_id: create.table_id,
            time: create.time,
            party_size: create.party_size,
            status: create.status,
        })
    }

    /// Move a reservation to `next`
    pub async fn transition(
        &self,
        reservation: &mut Reservation,
        next: ReservationStatus,
    ) -> SimResult<()> {
        transition_reservation(self.gateway.as_ref(), reservation, next).await
    }
}

/// Validate and persist a status change
///
/// Illegal transitions are rejected before any remote call. The local status
/// only changes once the remote update succeeded.
pub async fn transition_reservation(
    gateway: &dyn RemoteEntityGateway,
    reservation: &mut Reservation,
    next: ReservationStatus,
) -> SimResult<()> {
    let mut updated = reservation.clone();
    updated.transition(next)?;

    gateway
        .update(
            EntityType::Reservation,
            &reservation.id,
            json!({ "status": next }),
        )
        .await?;

    *reservation = updated;
    Ok(())
}
