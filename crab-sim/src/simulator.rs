//! Multi-day simulation driver
//!
//! ```text
//! EntityReconciler ─► Catalog::load
//!                          │
//!        ┌──────── for each day (seeded rng) ────────┐
//!        │ shifts → reservations → orders → payments │
//!        │            → refunds → DaySummary         │
//!        └──────────────► setup store ◄──────────────┘
//!                          │
//!              PeriodAnalyticsAggregator
//! ```
//!
//! Every completed day is sealed in the setup store under
//! `simulate_day:<YYYY-MM-DD>`; a re-run loads sealed days instead of
//! simulating them again.

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use shared::models::{DayStats, DaySummary, PeriodSummary, PhaseCounter};
use shared::money::format_cents;
use std::sync::Arc;

use crate::core::{MAX_SIM_DAYS, ServiceKind, SimError, SimResult, SimState};
use crate::setup::{Catalog, ReconcileReport};
use crate::utils::time::date_range;

/// Step name prefix for sealed days
pub const DAY_STEP_PREFIX: &str = "simulate_day:";

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub reconcile: ReconcileReport,
    pub days: Vec<DaySummary>,
    pub period: PeriodSummary,
    /// Per-phase success / error counts over all days
    pub counters: DayStats,
    /// Days loaded from the store instead of simulated
    pub resumed_days: u32,
}

pub struct Simulator {
    state: SimState,
}

impl Simulator {
    pub fn new(state: SimState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Reconcile, then simulate `days` consecutive days from `start`
    ///
    /// Reconciliation and storage errors abort the run; everything else is
    /// counted per unit of work.
    pub async fn run(&self, start: NaiveDate, days: u32) -> SimResult<SimulationReport> {
        if !(1..=MAX_SIM_DAYS).contains(&days) {
            return Err(SimError::Config(format!(
                "days must be between 1 and {}, got {}",
                MAX_SIM_DAYS, days
            )));
        }

        tracing::info!(service = %ServiceKind::Reconciler, "Reconciling reference entities");
        let reconcile = self.state.reconciler().run().await?;
        let catalog = Arc::new(Catalog::load(self.state.store())?);

        let mut day_records = Vec::with_capacity(days as usize);
        let mut counters = DayStats::default();
        let mut resumed_days = 0;

        for (index, date) in date_range(start, days).enumerate() {
            let step = day_step_name(date);

            if let Some(day) = self.sealed_day(&step)? {
                tracing::info!(%date, "Day already simulated, loaded from store");
                resumed_days += 1;
                counters.merge(&day.stats);
                day_records.push(day);
                continue;
            }

            let day = self.simulate_day(&catalog, date, index as u64).await;
            self.state
                .store()
                .mark_step_completed(&step, Some(serde_json::to_value(&day)?))?;

            counters.merge(&day.stats);
            day_records.push(day);
        }

        let period = self.state.analytics().summarize(&day_records, start, days);
        tracing::info!(
            service = %ServiceKind::Analytics,
            start = %period.start_date,
            end = %period.end_date,
            orders = period.total_orders,
            revenue = %format_cents(period.total_revenue),
            refunds = %format_cents(period.total_refunds),
            net = %format_cents(period.total_net_revenue),
            average = %period.average_order_value,
            resumed_days,
            "Simulation finished"
        );

        Ok(SimulationReport {
            reconcile,
            days: day_records,
            period,
            counters,
            resumed_days,
        })
    }

    /// Simulate one day
    ///
    /// Never fails as a whole: every phase isolates its own failures.
    pub async fn simulate_day(&self, catalog: &Arc<Catalog>, date: NaiveDate, day_index: u64) -> DaySummary {
        let mut rng = day_rng(self.state.config.seed, day_index);

        tracing::debug!(service = %ServiceKind::ShiftScheduler, %date, "Scheduling shifts");
        let shifts = self
            .state
            .shift_scheduler()
            .schedule(date, &catalog.employees, &mut rng)
            .await;

        tracing::debug!(service = %ServiceKind::ReservationGenerator, %date, "Generating reservations");
        let booked = self
            .state
            .reservation_generator()
            .generate(date, &catalog.customers, &catalog.tables, &mut rng)
            .await;
        let mut reservations = booked.reservations;

        tracing::debug!(service = %ServiceKind::OrderBuilder, %date, "Building orders");
        let builder = self.state.order_builder(catalog.clone());
        let mut orders = builder.walk_in_orders(date, &shifts.working, &mut rng).await;
        orders.merge(
            builder
                .reservation_orders(date, &mut reservations, &shifts.working, &mut rng)
                .await,
        );

        tracing::debug!(service = %ServiceKind::PaymentSettlement, %date, "Settling orders");
        let settled = self
            .state
            .payment_settlement()
            .settle(&orders.orders, &mut rng)
            .await;

        tracing::debug!(service = %ServiceKind::RefundProcessor, %date, "Processing refunds");
        let refunded = self
            .state
            .refund_processor()
            .process(&orders.orders, &mut rng)
            .await;

        let stats = DayStats {
            shifts: PhaseCounter {
                success_count: shifts.shifts_created,
                error_count: shifts.failed,
            },
            reservations: PhaseCounter {
                success_count: reservations.len() as u32,
                error_count: booked.failed,
            },
            orders: orders.created,
            line_items: orders.line_items,
            payments: settled.captured,
            tips: settled.tips,
            refunds: refunded.issued,
        };

        let day = DaySummary {
            date,
            employees_working: shifts.working.len() as u32,
            shifts_created: shifts.shifts_created,
            reservations,
            orders: orders.orders,
            payments: settled.payments,
            refunds: refunded.refunds,
            stats,
        };

        tracing::info!(
            %date,
            employees = day.employees_working,
            reservations = day.reservations.len(),
            orders = day.orders.len(),
            unfinalized = orders.unfinalized,
            voided = orders.voided,
            revenue = %format_cents(day.revenue()),
            refunds = %format_cents(day.refunded()),
            "Day simulated"
        );
        day
    }

    /// Load a sealed day; an unreadable payload is simulated again
    fn sealed_day(&self, step: &str) -> SimResult<Option<DaySummary>> {
        let store = self.state.store();
        if !store.step_completed(step)? {
            return Ok(None);
        }
        let Some(payload) = store.get_step_data(step)? else {
            return Ok(None);
        };
        match serde_json::from_value(payload) {
            Ok(day) => Ok(Some(day)),
            Err(e) => {
                tracing::warn!(step, error = %e, "Sealed day unreadable, simulating again");
                Ok(None)
            }
        }
    }
}

/// Setup step name of a simulated day
pub fn day_step_name(date: NaiveDate) -> String {
    format!("{}{}", DAY_STEP_PREFIX, date.format("%Y-%m-%d"))
}

/// Deterministic rng for one day of a run
pub fn day_rng(seed: u64, day_index: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ day_index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
