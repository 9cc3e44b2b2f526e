use std::sync::Arc;

use chrono::NaiveDate;
use crab_client::{EntityType, FailureKind, MemoryGateway, Operation};
use crab_sim::setup::Catalog;
use crab_sim::simulator::day_step_name;
use crab_sim::{CountRange, SimConfig, SimError, SimState, SimulationProfile, Simulator};
use shared::models::{
    Customer, DiningTable, Employee, MenuItem, OrderSource, ReservationStatus, TaxRate,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn state(gw: &Arc<MemoryGateway>, profile: SimulationProfile) -> SimState {
    let mut config = SimConfig::new("unused");
    config.seed = 7;
    config.profile = profile;
    SimState::in_memory(config, gw.clone()).unwrap()
}

fn single_table_catalog() -> Catalog {
    Catalog {
        tax_rates: vec![TaxRate {
            id: "TX-1".into(),
            name: "Sales Tax".into(),
            rate: 8,
            is_default: true,
        }],
        menu_items: vec![MenuItem {
            id: "IT-1".into(),
            name: "Classic Burger".into(),
            price: 1000,
            category_id: None,
            modifier_group_ids: Vec::new(),
        }],
        employees: vec![Employee {
            id: "EM-1".into(),
            name: "Sam".into(),
            role_id: None,
            pin: None,
        }],
        tables: vec![DiningTable {
            id: "TB-1".into(),
            name: "Table 1".into(),
            capacity: 2,
        }],
        customers: vec![Customer {
            id: "CU-1".into(),
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            email: None,
            phone: None,
        }],
        ..Catalog::default()
    }
}

fn scenario_profile() -> SimulationProfile {
    SimulationProfile {
        reservations_per_day: CountRange::exactly(1),
        walk_in_orders_per_day: CountRange::exactly(1),
        line_items_per_order: CountRange::exactly(1),
        item_quantity: CountRange::exactly(1),
        discount_probability: 0.0,
        modifier_probability: 0.0,
        note_probability: 0.0,
        void_probability: 0.0,
        reservation_modifier_probability: 0.0,
        tip_probability: 1.0,
        tip_percent: CountRange::exactly(20),
        refunds_per_day: CountRange::exactly(0),
        ..SimulationProfile::default()
    }
}

#[tokio::test]
async fn single_item_day_end_to_end() {
    let gw = Arc::new(MemoryGateway::new());
    let sim = Simulator::new(state(&gw, scenario_profile()));
    let catalog = Arc::new(single_table_catalog());

    let day = sim.simulate_day(&catalog, start(), 0).await;

    assert_eq!(day.employees_working, 1);
    assert_eq!(day.shifts_created, 1);
    assert_eq!(day.orders.len(), 2);

    let walk_in = &day.orders[0];
    assert_eq!(walk_in.source, OrderSource::WalkIn);
    assert_eq!(walk_in.total, Some(1080));

    let payment = day.payments.iter().find(|p| p.order_id == walk_in.id).unwrap();
    assert_eq!(payment.amount, 1080);
    assert_eq!(payment.tip_amount, 216);

    assert_eq!(day.reservations.len(), 1);
    assert_eq!(day.reservations[0].status, ReservationStatus::Completed);
    assert!(day.refunds.is_empty());

    // every shift is closed at the end of the day
    let shifts = gw.records(EntityType::Shift);
    assert_eq!(shifts.len(), 1);
    assert!(shifts[0].str_field("clock_out").is_some());
}

#[tokio::test]
async fn multi_day_run_is_consistent() {
    let gw = Arc::new(MemoryGateway::new());
    let sim = Simulator::new(state(&gw, SimulationProfile::default()));

    let report = sim.run(start(), 3).await.unwrap();
    assert_eq!(report.days.len(), 3);
    assert_eq!(report.resumed_days, 0);

    let period = &report.period;
    assert_eq!(period.days, 3);
    assert_eq!(period.total_net_revenue, period.total_revenue - period.total_refunds);
    let daily: i64 = period.daily_revenue.iter().map(|d| d.revenue).sum();
    assert_eq!(daily, period.total_revenue);
    assert!(period.top_items.len() <= 10);

    for day in &report.days {
        for refund in &day.refunds {
            let payment = day.payments.iter().find(|p| p.id == refund.payment_id).unwrap();
            assert!(refund.amount > 0);
            assert!(refund.amount <= payment.amount);
        }
        // no attrition in the default profile: every booking is served
        assert!(
            day.reservations
                .iter()
                .all(|r| r.status == ReservationStatus::Completed)
        );
        assert!(day.orders.iter().all(|o| o.total.is_some()));
    }

    let simulated: usize = report.days.iter().map(|d| d.orders.len()).sum();
    assert_eq!(gw.records(EntityType::Order).len(), simulated);
}

#[tokio::test]
async fn rerun_resumes_sealed_days() {
    let gw = Arc::new(MemoryGateway::new());
    let sim = Simulator::new(state(&gw, SimulationProfile::default()));

    let first = sim.run(start(), 2).await.unwrap();
    let orders_after_first = gw.records(EntityType::Order).len();

    let second = sim.run(start(), 3).await.unwrap();
    assert!(second.reconcile.all_skipped());
    assert_eq!(second.resumed_days, 2);
    assert_eq!(second.days[..2], first.days[..]);

    let new_orders = gw.records(EntityType::Order).len() - orders_after_first;
    assert_eq!(new_orders, second.days[2].orders.len());
}

#[tokio::test]
async fn rerun_closes_shift_left_open() {
    let gw = Arc::new(MemoryGateway::new());
    gw.fail_on(EntityType::Shift, Operation::Update, 1, FailureKind::Transient);
    let sim = Simulator::new(state(&gw, SimulationProfile::default()));

    let open_shifts = || {
        gw.records(EntityType::Shift)
            .iter()
            .filter(|r| r.str_field("clock_out").is_none())
            .count()
    };

    let first = sim.run(start(), 1).await.unwrap();
    assert_eq!(first.counters.shifts.error_count, 1);
    assert_eq!(open_shifts(), 1);

    let second = sim.run(start(), 2).await.unwrap();
    let sweep = second.reconcile.step("shifts").unwrap();
    assert!(!sweep.skipped);
    assert_eq!(sweep.closed_shifts, 1);
    assert_eq!(open_shifts(), 0);
}

#[tokio::test]
async fn same_seed_same_period() {
    let a = Arc::new(MemoryGateway::new());
    let b = Arc::new(MemoryGateway::new());

    let first = Simulator::new(state(&a, SimulationProfile::default()))
        .run(start(), 2)
        .await
        .unwrap();
    let second = Simulator::new(state(&b, SimulationProfile::default()))
        .run(start(), 2)
        .await
        .unwrap();

    assert_eq!(first.period, second.period);
    assert_eq!(first.counters, second.counters);
}

#[tokio::test]
async fn fatal_reconciliation_simulates_nothing() {
    let gw = Arc::new(MemoryGateway::new());
    gw.fail_always(EntityType::TaxRate, Operation::Create, FailureKind::Transient);
    let sim = Simulator::new(state(&gw, SimulationProfile::default()));

    let err = sim.run(start(), 2).await.unwrap_err();
    assert!(matches!(err, SimError::FatalReconciliation { .. }));
    assert!(!sim.state().store().step_completed(&day_step_name(start())).unwrap());
    assert!(gw.records(EntityType::Order).is_empty());
}

#[tokio::test]
async fn day_count_out_of_range_is_rejected() {
    let gw = Arc::new(MemoryGateway::new());
    let sim = Simulator::new(state(&gw, SimulationProfile::default()));

    assert!(matches!(sim.run(start(), 0).await, Err(SimError::Config(_))));
    assert_eq!(gw.total_creates(), 0);
}
