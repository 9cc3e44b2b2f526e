//! Minor-unit money helpers
//!
//! Every monetary amount in Crab Sim is an `i64` count of minor currency units
//! (cents). Percentage math goes through `rust_decimal` so that each entry is
//! rounded exactly once, half away from zero, and never drifts through `f64`.

use rust_decimal::prelude::*;

/// Amount in minor currency units (1 USD = 100)
pub type Cents = i64;

/// Whole-percent value (8 = 8%)
pub type Percent = u32;

/// Minor units per major unit
const MINOR_SCALE: u32 = 2;

/// `round(base × pct / 100)`, rounded half away from zero.
///
/// Returns `None` when the intermediate product does not fit.
pub fn percent_of(base: Cents, pct: Percent) -> Option<Cents> {
    let product = Decimal::from(base).checked_mul(Decimal::from(pct))?;
    product
        .checked_div(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Convert minor units to a major-unit decimal (1080 → 10.80)
#[inline]
pub fn to_major(amount: Cents) -> Decimal {
    Decimal::new(amount, MINOR_SCALE)
}

/// `total / count` in major units, rounded to 2 decimal places.
///
/// Zero when `count` is zero.
pub fn average_major(total: Cents, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (to_major(total) / Decimal::from(count))
        .round_dp_with_strategy(MINOR_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Human readable amount for log lines ("10.80")
pub fn format_cents(amount: Cents) -> String {
    format!("{:.2}", to_major(amount))
}
