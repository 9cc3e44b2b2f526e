//! Day and Period Report Models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, Payment, Refund, Reservation};
use crate::money::Cents;

/// Success / error tally for one phase of work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounter {
    pub success_count: u32,
    pub error_count: u32,
}

impl PhaseCounter {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    pub fn merge(&mut self, other: PhaseCounter) {
        self.success_count += other.success_count;
        self.error_count += other.error_count;
    }
}

/// Per-phase counters of one simulated day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub shifts: PhaseCounter,
    pub reservations: PhaseCounter,
    pub orders: PhaseCounter,
    pub line_items: PhaseCounter,
    pub payments: PhaseCounter,
    pub tips: PhaseCounter,
    pub refunds: PhaseCounter,
}

impl DayStats {
    pub fn merge(&mut self, other: &DayStats) {
        self.shifts.merge(other.shifts);
        self.reservations.merge(other.reservations);
        self.orders.merge(other.orders);
        self.line_items.merge(other.line_items);
        self.payments.merge(other.payments);
        self.tips.merge(other.tips);
        self.refunds.merge(other.refunds);
    }
}

/// Sealed record of one simulated day
///
/// Immutable once the day completes; the unit consumed by period analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub employees_working: u32,
    pub shifts_created: u32,
    pub reservations: Vec<Reservation>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub refunds: Vec<Refund>,
    #[serde(default)]
    pub stats: DayStats,
}

impl DaySummary {
    /// Orders that count towards analytics (voided orders excluded)
    pub fn counted_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| !o.is_voided())
    }

    pub fn revenue(&self) -> Cents {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn refunded(&self) -> Cents {
        self.refunds.iter().map(|r| r.amount).sum()
    }

    pub fn tips(&self) -> Cents {
        self.payments.iter().map(|p| p.tip_amount).sum()
    }
}

/// One point of the daily revenue series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: Cents,
    pub refunds: Cents,
}

/// Day with the most orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusiestDay {
    pub date: NaiveDate,
    pub orders: u64,
}

/// Units sold per menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSales {
    pub item_id: String,
    pub name: String,
    pub quantity: u64,
}

/// Orders taken per employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOrderCount {
    pub employee_id: String,
    pub orders: u64,
}

/// Period roll-up, always recomputed from the day records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub total_orders: u64,
    pub total_revenue: Cents,
    pub total_refunds: Cents,
    pub total_net_revenue: Cents,
    pub total_tips: Cents,
    /// Major units, 2 decimal places
    pub average_order_value: Decimal,
    pub busiest_day: Option<BusiestDay>,
    pub top_items: Vec<ItemSales>,
    pub employee_order_counts: Vec<EmployeeOrderCount>,
    pub daily_revenue: Vec<DailyRevenue>,
}
