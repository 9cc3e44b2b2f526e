use super::*;
use chrono::NaiveDate;
use shared::models::{Modification, OrderSource, OrderState};

fn item(price: Cents, quantity: u32) -> LineItem {
    LineItem {
        id: format!("LI-{}", price),
        item_id: "IT-1".to_string(),
        name: "Item".to_string(),
        unit_price: price,
        quantity,
        modifications: vec![],
        note: None,
    }
}

fn modification(price: Cents) -> Modification {
    Modification {
        id: None,
        modifier_id: "MD-1".to_string(),
        name: "Bacon".to_string(),
        price,
    }
}

fn pct_discount(p: Percent) -> OrderDiscount {
    OrderDiscount {
        id: None,
        name: format!("{}% off", p),
        percentage: Some(p),
        amount: None,
    }
}

fn fixed_discount(amount: Cents) -> OrderDiscount {
    OrderDiscount {
        id: None,
        name: "Coupon".to_string(),
        percentage: None,
        amount: Some(amount),
    }
}

fn charge(percentage: Option<Percent>, amount: Option<Cents>) -> ServiceCharge {
    ServiceCharge {
        id: None,
        name: "Large party".to_string(),
        percentage,
        amount,
    }
}

fn tax(rate: Percent) -> TaxRate {
    TaxRate {
        id: "TX-1".to_string(),
        name: "Sales Tax".to_string(),
        rate,
        is_default: true,
    }
}

#[test]
fn test_two_items_ten_percent_off_eight_percent_tax() {
    let v = calculate(
        &[item(1000, 1), item(500, 1)],
        &[pct_discount(10)],
        &[],
        &[tax(8)],
    )
    .unwrap();

    assert_eq!(v.subtotal, 1500);
    assert_eq!(v.discount_total, 150);
    assert_eq!(v.after_discount, 1350);
    assert_eq!(v.tax_total, 108);
    assert_eq!(v.total, 1458);
}

#[test]
fn test_valuation_is_deterministic() {
    let items = [item(1000, 1), item(500, 1)];
    let first = calculate(&items, &[pct_discount(10)], &[], &[tax(8)]).unwrap();
    for _ in 0..10 {
        let again = calculate(&items, &[pct_discount(10)], &[], &[tax(8)]).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_single_item_with_tax() {
    let v = calculate(&[item(1000, 1)], &[], &[], &[tax(8)]).unwrap();
    assert_eq!(v.total, 1080);
}

#[test]
fn test_modifications_are_per_unit() {
    let mut li = item(1499, 2);
    li.modifications.push(modification(200));
    li.modifications.push(modification(150));
    assert_eq!(line_total(&li).unwrap(), (1499 + 200 + 150) * 2);
}

#[test]
fn test_fixed_discount_uses_magnitude() {
    let v = calculate(&[item(2000, 1)], &[fixed_discount(-500)], &[], &[]).unwrap();
    assert_eq!(v.discount_total, 500);
    assert_eq!(v.total, 1500);
    assert_eq!(v.entries[0].amount, -500);

    // a positive stored amount is still subtracted
    let v = calculate(&[item(2000, 1)], &[fixed_discount(500)], &[], &[]).unwrap();
    assert_eq!(v.total, 1500);
}

#[test]
fn test_service_charge_on_discounted_base_then_tax() {
    // subtotal 10000, -10% = 9000, +18% = 1620 → 10620, +8% = 849.6 → 850
    let v = calculate(
        &[item(5000, 2)],
        &[pct_discount(10)],
        &[charge(Some(18), None)],
        &[tax(8)],
    )
    .unwrap();
    assert_eq!(v.after_discount, 9000);
    assert_eq!(v.service_charge_total, 1620);
    assert_eq!(v.after_charges, 10620);
    assert_eq!(v.tax_total, 850);
    assert_eq!(v.total, 11470);
}

#[test]
fn test_fixed_service_charge() {
    let v = calculate(&[item(1000, 1)], &[], &[charge(None, Some(250))], &[]).unwrap();
    assert_eq!(v.total, 1250);
}

#[test]
fn test_each_entry_rounded_independently() {
    // 1255 × 10% = 125.5 → 126 per discount, twice = 252
    // once-at-the-end rounding would give round(251.0) = 251
    let v = calculate(
        &[item(1255, 1)],
        &[pct_discount(10), pct_discount(10)],
        &[],
        &[],
    )
    .unwrap();
    assert_eq!(v.discount_total, 252);
    assert_eq!(v.total, 1003);
}

#[test]
fn test_multiple_tax_rates_share_base() {
    // base 1003: 8% = 80.24 → 80, 5% = 50.15 → 50
    let v = calculate(&[item(1003, 1)], &[], &[], &[tax(8), tax(5)]).unwrap();
    assert_eq!(v.tax_total, 130);
    assert_eq!(v.total, 1133);
}

#[test]
fn test_entries_reconcile_with_total() {
    let v = calculate(
        &[item(1999, 3), item(799, 1)],
        &[pct_discount(20), fixed_discount(-300)],
        &[charge(Some(18), None)],
        &[tax(8)],
    )
    .unwrap();
    let adjustments: Cents = v.entries.iter().map(|e| e.amount).sum();
    assert_eq!(v.subtotal + adjustments, v.total);
    assert_eq!(v.entries.len(), 4);
    assert_eq!(v.entries[3].kind, EntryKind::Tax);
}

#[test]
fn test_malformed_adjustments_contribute_zero() {
    let malformed = OrderDiscount {
        id: None,
        name: "Broken".to_string(),
        percentage: None,
        amount: None,
    };
    let v = calculate(&[item(1000, 1)], &[malformed], &[charge(None, None)], &[]).unwrap();
    assert_eq!(v.total, 1000);
    assert_eq!(v.entries.len(), 2);
    assert!(v.entries.iter().all(|e| e.amount == 0));
}

#[test]
fn test_empty_order() {
    let v = calculate(&[], &[], &[], &[tax(8)]).unwrap();
    assert_eq!(v.total, 0);
}

#[test]
fn test_overflow_is_an_error() {
    let err = calculate(&[item(Cents::MAX, 2)], &[], &[], &[]).unwrap_err();
    assert_eq!(err, ValuationError::Overflow("line item total"));

    let err = calculate(&[item(Cents::MAX, 1), item(1, 1)], &[], &[], &[]).unwrap_err();
    assert_eq!(err, ValuationError::Overflow("subtotal"));
}

#[test]
fn test_valuate_order() {
    let order = Order {
        id: "OR-1".to_string(),
        source: OrderSource::WalkIn,
        state: OrderState::Open,
        created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap(),
        employee_id: None,
        customer_id: None,
        table_id: None,
        reservation_id: None,
        line_items: vec![item(1000, 1), item(500, 1)],
        discounts: vec![pct_discount(10)],
        service_charges: vec![],
        tax_rates: vec![tax(8)],
        total: None,
    };
    assert_eq!(valuate(&order).unwrap().total, 1458);
}
