//! Shift scheduling
//!
//! Staffs a simulated day: a sampled fraction of the roster is split into a
//! morning and an evening shift. Each shift is opened (clock-in) and then
//! closed (clock-out) remotely. Failures are isolated per employee.

use chrono::{NaiveDate, NaiveDateTime};
use crab_client::{EntityType, RemoteEntityGateway, to_payload};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use shared::ErrorCode;
use shared::models::{Employee, Shift, ShiftClose, ShiftCreate};
use std::sync::Arc;

use crate::core::{SimResult, SimulationProfile};
use crate::utils::time::{at, offset_minutes};

/// Outcome of scheduling one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftOutcome {
    /// Employees selected for the day
    pub employees_assigned: u32,
    /// Shifts successfully opened
    pub shifts_created: u32,
    /// Clock-in or clock-out failures
    pub failed: u32,
    /// Employees with an opened shift, available to take orders
    pub working: Vec<Employee>,
    pub shifts: Vec<Shift>,
}

/// Morning or evening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftSlot {
    Morning,
    Evening,
}

pub struct ShiftScheduler {
    gateway: Arc<dyn RemoteEntityGateway>,
    profile: SimulationProfile,
}

impl ShiftScheduler {
    pub fn new(gateway: Arc<dyn RemoteEntityGateway>, profile: SimulationProfile) -> Self {
        Self { gateway, profile }
    }

    /// Number of employees to staff from a roster of `roster` people
    fn staff_count<R: Rng + ?Sized>(&self, roster: usize, rng: &mut R) -> usize {
        if roster == 0 {
            return 0;
        }
        let (lo, hi) = (self.profile.staff_fraction_min, self.profile.staff_fraction_max);
        let fraction = if lo < hi { rng.gen_range(lo..=hi) } else { lo };
        ((roster as f64 * fraction).round() as usize).clamp(1, roster)
    }

    /// Clock-in / clock-out for a slot, with jitter
    fn shift_window<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        slot: ShiftSlot,
        rng: &mut R,
    ) -> (NaiveDateTime, NaiveDateTime) {
        let j = i64::from(self.profile.shift_jitter_minutes);
        let mut jitter = || if j == 0 { 0 } else { rng.gen_range(-j..=j) };
        match slot {
            ShiftSlot::Morning => (
                offset_minutes(at(date, 8, 0), jitter()),
                offset_minutes(at(date, 16, 0), jitter()),
            ),
            ShiftSlot::Evening => (offset_minutes(at(date, 16, 0), jitter()), at(date, 23, 59)),
        }
    }

    /// Schedule `date` from `employees`
    pub async fn schedule<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        employees: &[Employee],
        rng: &mut R,
    ) -> ShiftOutcome {
        let mut outcome = ShiftOutcome::default();

        let count = self.staff_count(employees.len(), rng);
        let mut selected: Vec<&Employee> = employees.iter().collect();
        selected.shuffle(rng);
        selected.truncate(count);
        outcome.employees_assigned = count as u32;

        let morning = count.div_ceil(2);
        for (i, employee) in selected.into_iter().enumerate() {
            let slot = if i < morning { ShiftSlot::Morning } else { ShiftSlot::Evening };
            let (clock_in, clock_out) = self.shift_window(date, slot, rng);

            let shift = match self.open_shift(employee, clock_in).await {
                Ok(shift) => shift,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        employee_id = %employee.id,
                        %date,
                        code = %e.unit_code(ErrorCode::ShiftFailed),
                        cause = %e.code(),
                        error = %e,
                        "Clock-in failed, employee not working today"
                    );
                    continue;
                }
            };
            outcome.shifts_created += 1;
            outcome.working.push(employee.clone());

            match self.close_shift(&shift, clock_out).await {
                Ok(closed) => outcome.shifts.push(closed),
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        shift_id = %shift.id,
                        employee_id = %employee.id,
                        code = %e.unit_code(ErrorCode::ShiftFailed),
                        error = %e,
                        "Clock-out failed, shift left open"
                    );
                    outcome.shifts.push(shift);
                }
            }
        }

        tracing::info!(
            %date,
            assigned = outcome.employees_assigned,
            created = outcome.shifts_created,
            failed = outcome.failed,
            "Shifts scheduled"
        );
        outcome
    }

    async fn open_shift(&self, employee: &Employee, clock_in: NaiveDateTime) -> SimResult<Shift> {
        let payload = to_payload(&ShiftCreate {
            employee_id: employee.id.clone(),
            clock_in,
        })?;
        let record = self.gateway.create(EntityType::Shift, payload).await?;
        Ok(Shift {
            id: record.id,
            employee_id: employee.id.clone(),
            clock_in,
            clock_out: None,
        })
    }

    async fn close_shift(&self, shift: &Shift, clock_out: NaiveDateTime) -> SimResult<Shift> {
        let payload = to_payload(&ShiftClose { clock_out })?;
        self.gateway
            .update(EntityType::Shift, &shift.id, payload)
            .await?;
        Ok(Shift {
            clock_out: Some(clock_out),
            ..shift.clone()
        })
    }
}
