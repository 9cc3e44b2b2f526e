//! Order valuation in integer minor units
//!
//! ```text
//! subtotal    = Σ line items: (unit_price + Σ modification.price) × quantity
//! afterDisc   = subtotal − Σ discounts: percentage? round(subtotal × pct/100) : |amount|
//! afterCharge = afterDisc + Σ service charges: percentage? round(afterDisc × pct/100) : amount
//! total       = afterCharge + Σ tax rates: round(afterCharge × rate/100)
//! ```
//!
//! Every discount / charge / tax entry is rounded on its own (half away from
//! zero) and reported individually, so summing `entries` reproduces the
//! total exactly. All arithmetic is checked.

use serde::{Deserialize, Serialize};
use shared::models::{LineItem, Order, OrderDiscount, ServiceCharge, TaxRate};
use shared::money::percent_of;
use shared::{Cents, ErrorCode, Percent};
use thiserror::Error;

/// Valuation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

pub type ValuationResult<T> = Result<T, ValuationError>;

/// Which stage of the formula an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Discount,
    ServiceCharge,
    Tax,
}

/// One individually rounded adjustment
///
/// `amount` is the signed effect on the running total (discounts negative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationEntry {
    pub kind: EntryKind,
    pub name: String,
    pub percentage: Option<Percent>,
    pub amount: Cents,
}

/// Result of valuating an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub subtotal: Cents,
    pub discount_total: Cents,
    pub after_discount: Cents,
    pub service_charge_total: Cents,
    pub after_charges: Cents,
    pub tax_total: Cents,
    pub total: Cents,
    pub entries: Vec<ValuationEntry>,
}

/// `(unit_price + Σ modification.price) × quantity`
pub fn line_total(item: &LineItem) -> ValuationResult<Cents> {
    let mut unit = item.unit_price;
    for m in &item.modifications {
        unit = unit
            .checked_add(m.price)
            .ok_or(ValuationError::Overflow("line item unit price"))?;
    }
    unit.checked_mul(Cents::from(item.quantity))
        .ok_or(ValuationError::Overflow("line item total"))
}

pub fn subtotal(items: &[LineItem]) -> ValuationResult<Cents> {
    items.iter().try_fold(0 as Cents, |acc, item| {
        acc.checked_add(line_total(item)?)
            .ok_or(ValuationError::Overflow("subtotal"))
    })
}

fn pct(base: Cents, pct: Percent, what: &'static str) -> ValuationResult<Cents> {
    percent_of(base, pct).ok_or(ValuationError::Overflow(what))
}

/// Positive magnitude removed by one discount
///
/// A discount with neither percentage nor amount contributes zero.
pub fn discount_amount(discount: &OrderDiscount, subtotal: Cents) -> ValuationResult<Cents> {
    match (discount.percentage, discount.amount) {
        (Some(p), _) => pct(subtotal, p, "discount"),
        (None, Some(amount)) => amount
            .checked_abs()
            .ok_or(ValuationError::Overflow("discount")),
        (None, None) => {
            tracing::warn!(
                discount = %discount.name,
                code = %ErrorCode::MalformedAdjustment,
                "Discount has neither percentage nor amount, contributes zero"
            );
            Ok(0)
        }
    }
}

/// Amount added by one service charge
pub fn service_charge_amount(charge: &ServiceCharge, base: Cents) -> ValuationResult<Cents> {
    match (charge.percentage, charge.amount) {
        (Some(p), _) => pct(base, p, "service charge"),
        (None, Some(amount)) => Ok(amount),
        (None, None) => {
            tracing::warn!(
                charge = %charge.name,
                code = %ErrorCode::MalformedAdjustment,
                "Service charge has neither percentage nor amount, contributes zero"
            );
            Ok(0)
        }
    }
}

pub fn tax_amount(rate: &TaxRate, base: Cents) -> ValuationResult<Cents> {
    pct(base, rate.rate, "tax")
}

/// Apply the valuation formula to raw order parts
pub fn calculate(
    line_items: &[LineItem],
    discounts: &[OrderDiscount],
    service_charges: &[ServiceCharge],
    tax_rates: &[TaxRate],
) -> ValuationResult<Valuation> {
    let mut v = Valuation {
        subtotal: subtotal(line_items)?,
        ..Default::default()
    };

    // 折扣: 基于小计
    for d in discounts {
        let amount = discount_amount(d, v.subtotal)?;
        v.discount_total = v
            .discount_total
            .checked_add(amount)
            .ok_or(ValuationError::Overflow("discount total"))?;
        v.entries.push(ValuationEntry {
            kind: EntryKind::Discount,
            name: d.name.clone(),
            percentage: d.percentage,
            amount: -amount,
        });
    }
    v.after_discount = v
        .subtotal
        .checked_sub(v.discount_total)
        .ok_or(ValuationError::Overflow("after discount"))?;

    // 服务费: 基于折后金额
    for c in service_charges {
        let amount = service_charge_amount(c, v.after_discount)?;
        v.service_charge_total = v
            .service_charge_total
            .checked_add(amount)
            .ok_or(ValuationError::Overflow("service charge total"))?;
        v.entries.push(ValuationEntry {
            kind: EntryKind::ServiceCharge,
            name: c.name.clone(),
            percentage: c.percentage,
            amount,
        });
    }
    v.after_charges = v
        .after_discount
        .checked_add(v.service_charge_total)
        .ok_or(ValuationError::Overflow("after charges"))?;

    // 税: 基于加服务费后的金额
    for t in tax_rates {
        let amount = tax_amount(t, v.after_charges)?;
        v.tax_total = v
            .tax_total
            .checked_add(amount)
            .ok_or(ValuationError::Overflow("tax total"))?;
        v.entries.push(ValuationEntry {
            kind: EntryKind::Tax,
            name: t.name.clone(),
            percentage: Some(t.rate),
            amount,
        });
    }
    v.total = v
        .after_charges
        .checked_add(v.tax_total)
        .ok_or(ValuationError::Overflow("total"))?;

    Ok(v)
}

/// Valuate an order as currently held locally
pub fn valuate(order: &Order) -> ValuationResult<Valuation> {
    calculate(
        &order.line_items,
        &order.discounts,
        &order.service_charges,
        &order.tax_rates,
    )
}

#[cfg(test)]
mod tests;
