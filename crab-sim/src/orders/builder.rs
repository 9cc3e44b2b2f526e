//! OrderBuilder - walk-in and reservation order streams

use chrono::{NaiveDate, NaiveDateTime};
use crab_client::{EntityType, RemoteEntityGateway, to_payload};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::json;
use shared::ErrorCode;
use shared::models::{
    AdjustmentCreate, Employee, LineItem, LineItemCreate, MenuItem, Modification,
    ModificationCreate, Order, OrderCreate, OrderDiscount, OrderSource, OrderState, Reservation,
    ReservationStatus, ServiceCharge,
};
use shared::money::format_cents;
use std::sync::Arc;

use super::OrderBatch;
use crate::core::{SimResult, SimulationProfile};
use crate::order_money::valuate;
use crate::reservations::transition_reservation;
use crate::setup::Catalog;
use crate::setup::standard::LINE_ITEM_NOTES;
use crate::utils::time::{at, offset_minutes};

/// Walk-in orders are placed between 11:00 and 22:00
const WALK_IN_OPEN: (u32, u32) = (11, 0);
const WALK_IN_WINDOW_MINUTES: i64 = 11 * 60;

/// Reservation orders are rung in after the party sits down
const SEATING_DELAY_MINUTES: i64 = 15;

/// Per-item options drawn before the line item is created
struct ItemPick<'a> {
    item: &'a MenuItem,
    quantity: u32,
    note: Option<&'static str>,
    with_modifier: bool,
}

pub struct OrderBuilder {
    gateway: Arc<dyn RemoteEntityGateway>,
    profile: SimulationProfile,
    catalog: Arc<Catalog>,
}

impl OrderBuilder {
    pub fn new(
        gateway: Arc<dyn RemoteEntityGateway>,
        profile: SimulationProfile,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            gateway,
            profile,
            catalog,
        }
    }

    // ========== Streams ==========

    /// Build the day's walk-in orders
    pub async fn walk_in_orders<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        working: &[Employee],
        rng: &mut R,
    ) -> OrderBatch {
        let mut batch = OrderBatch::default();
        if self.catalog.menu_items.is_empty() {
            tracing::warn!(%date, "Menu is empty, skipping walk-in orders");
            return batch;
        }

        let count = self.profile.walk_in_orders_per_day.sample(rng);
        for _ in 0..count {
            let created_at = offset_minutes(
                at(date, WALK_IN_OPEN.0, WALK_IN_OPEN.1),
                rng.gen_range(0..=WALK_IN_WINDOW_MINUTES),
            );
            let employee_id = working.choose(rng).map(|e| e.id.clone());
            let customer_id = if rng.gen_bool(self.profile.customer_probability) {
                self.catalog.customers.choose(rng).map(|c| c.id.clone())
            } else {
                None
            };
            let table_id = self.catalog.tables.choose(rng).map(|t| t.id.clone());

            let create = OrderCreate {
                state: OrderState::Open,
                source: OrderSource::WalkIn,
                created_at,
                employee_id,
                customer_id,
                table_id,
                reservation_id: None,
            };
            let mut order = match self.open_order(create).await {
                Ok(order) => order,
                Err(e) => {
                    batch.created.record_error();
                    tracing::warn!(
                        %date,
                        code = %e.unit_code(ErrorCode::OrderCreateFailed),
                        cause = %e.code(),
                        error = %e,
                        "Walk-in order creation failed"
                    );
                    continue;
                }
            };
            batch.created.record_success();

            let n_items = self.profile.line_items_per_order.sample(rng);
            for _ in 0..n_items {
                let Some(item) = self.catalog.menu_items.choose(rng) else {
                    break;
                };
                let pick = ItemPick {
                    item,
                    quantity: self.profile.item_quantity.sample(rng).max(1),
                    note: if rng.gen_bool(self.profile.note_probability) {
                        LINE_ITEM_NOTES.choose(rng).copied()
                    } else {
                        None
                    },
                    with_modifier: rng.gen_bool(self.profile.modifier_probability),
                };
                self.add_line_item(&mut order, pick, &mut batch, rng).await;
            }

            if rng.gen_bool(self.profile.discount_probability)
                && let Some(discount) = self.catalog.discounts.choose(rng)
            {
                let create = AdjustmentCreate {
                    order_id: order.id.clone(),
                    name: discount.name.clone(),
                    percentage: discount.percentage,
                    amount: discount.amount,
                };
                match self.add_discount(create).await {
                    Ok(d) => order.discounts.push(d),
                    Err(e) => tracing::warn!(order_id = %order.id, error = %e, "Discount not applied"),
                }
            }

            order.tax_rates = self.catalog.default_tax_rates();
            let void = rng.gen_bool(self.profile.void_probability);
            self.finalize_logged(&mut order, &mut batch).await;

            if void && order.total.is_some() {
                match self.void(&mut order).await {
                    Ok(()) => batch.voided += 1,
                    Err(e) => tracing::warn!(order_id = %order.id, error = %e, "Void failed"),
                }
            }

            batch.orders.push(order);
        }

        tracing::info!(
            %date,
            created = batch.created.success_count,
            failed = batch.created.error_count,
            voided = batch.voided,
            "Walk-in orders built"
        );
        batch
    }

    /// Build one order per pending reservation that has a customer
    ///
    /// The reservation is checked in (SEATED) first and marked COMPLETED once
    /// its order exists. If the order cannot be created it stays SEATED.
    pub async fn reservation_orders<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        reservations: &mut [Reservation],
        working: &[Employee],
        rng: &mut R,
    ) -> OrderBatch {
        let mut batch = OrderBatch::default();

        for reservation in reservations.iter_mut() {
            if reservation.status != ReservationStatus::Pending || reservation.customer_id.is_none()
            {
                continue;
            }

            if let Err(e) = transition_reservation(
                self.gateway.as_ref(),
                reservation,
                ReservationStatus::Seated,
            )
            .await
            {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    code = %e.unit_code(ErrorCode::ReservationFailed),
                    error = %e,
                    "Check-in failed"
                );
                continue;
            }

            let create = OrderCreate {
                state: OrderState::Open,
                source: OrderSource::Reservation,
                created_at: seated_order_time(reservation.time),
                employee_id: working.choose(rng).map(|e| e.id.clone()),
                customer_id: reservation.customer_id.clone(),
                table_id: Some(reservation.table_id.clone()),
                reservation_id: Some(reservation.id.clone()),
            };
            let mut order = match self.open_order(create).await {
                Ok(order) => order,
                Err(e) => {
                    batch.created.record_error();
                    tracing::warn!(
                        reservation_id = %reservation.id,
                        code = %e.unit_code(ErrorCode::OrderCreateFailed),
                        cause = %e.code(),
                        error = %e,
                        "Reservation order creation failed"
                    );
                    continue;
                }
            };
            batch.created.record_success();

            for _ in 0..party_item_count(reservation.party_size) {
                let Some(item) = self.catalog.menu_items.choose(rng) else {
                    break;
                };
                let pick = ItemPick {
                    item,
                    quantity: 1,
                    note: None,
                    with_modifier: rng.gen_bool(self.profile.reservation_modifier_probability),
                };
                self.add_line_item(&mut order, pick, &mut batch, rng).await;
            }

            if reservation.party_size >= self.profile.large_party_size {
                let create = AdjustmentCreate {
                    order_id: order.id.clone(),
                    name: format!("Large party ({}+)", self.profile.large_party_size),
                    percentage: Some(self.profile.large_party_service_pct),
                    amount: None,
                };
                match self.add_service_charge(create).await {
                    Ok(c) => order.service_charges.push(c),
                    Err(e) => {
                        tracing::warn!(order_id = %order.id, error = %e, "Service charge not applied")
                    }
                }
            }

            order.tax_rates = self.catalog.default_tax_rates();
            self.finalize_logged(&mut order, &mut batch).await;

            if let Err(e) = transition_reservation(
                self.gateway.as_ref(),
                reservation,
                ReservationStatus::Completed,
            )
            .await
            {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    code = %e.unit_code(ErrorCode::ReservationFailed),
                    error = %e,
                    "Completion failed"
                );
            }

            batch.orders.push(order);
        }

        tracing::info!(
            %date,
            created = batch.created.success_count,
            failed = batch.created.error_count,
            "Reservation orders built"
        );
        batch
    }

    // ========== Finalization ==========

    /// Valuate the order and persist its total
    ///
    /// `order.total` is only set once the remote update succeeded.
    pub async fn finalize(&self, order: &mut Order) -> SimResult<()> {
        let valuation = valuate(order)?;
        self.gateway
            .update(EntityType::Order, &order.id, json!({ "total": valuation.total }))
            .await?;
        order.total = Some(valuation.total);

        tracing::debug!(
            order_id = %order.id,
            subtotal = %format_cents(valuation.subtotal),
            tax = %format_cents(valuation.tax_total),
            total = %format_cents(valuation.total),
            "Order finalized"
        );
        Ok(())
    }

    async fn finalize_logged(&self, order: &mut Order, batch: &mut OrderBatch) {
        if let Err(e) = self.finalize(order).await {
            batch.unfinalized += 1;
            tracing::error!(
                order_id = %order.id,
                code = %e.unit_code(ErrorCode::OrderValuationFailed),
                error = %e,
                "Finalization failed, order kept without total"
            );
        }
    }

    async fn void(&self, order: &mut Order) -> SimResult<()> {
        self.gateway
            .update(
                EntityType::Order,
                &order.id,
                json!({ "state": OrderState::Voided }),
            )
            .await?;
        order.state = OrderState::Voided;
        Ok(())
    }

    // ========== Remote calls ==========

    async fn open_order(&self, create: OrderCreate) -> SimResult<Order> {
        let record = self
            .gateway
            .create(EntityType::Order, to_payload(&create)?)
            .await?;
        Ok(Order {
            id: record.id,
            source: create.source,
            state: create.state,
            created_at: create.created_at,
            employee_id: create.employee_id,
            customer_id: create.customer_id,
            table_id: create.table_id,
            reservation_id: create.reservation_id,
            line_items: Vec::new(),
            discounts: Vec::new(),
            service_charges: Vec::new(),
            tax_rates: Vec::new(),
            total: None,
        })
    }

    async fn add_line_item<R: Rng + ?Sized>(
        &self,
        order: &mut Order,
        pick: ItemPick<'_>,
        batch: &mut OrderBatch,
        rng: &mut R,
    ) {
        let modifier = if pick.with_modifier {
            self.catalog.modifiers_for(pick.item).choose(rng).copied()
        } else {
            None
        };

        let create = LineItemCreate {
            order_id: order.id.clone(),
            item_id: pick.item.id.clone(),
            name: pick.item.name.clone(),
            price: pick.item.price,
            quantity: pick.quantity,
            note: pick.note.map(str::to_string),
        };
        let record = match to_payload(&create) {
            Ok(payload) => self.gateway.create(EntityType::LineItem, payload).await,
            Err(e) => Err(e),
        };
        let mut line_item = match record {
            Ok(record) => LineItem {
                id: record.id,
                item_id: create.item_id,
                name: create.name,
                unit_price: create.price,
                quantity: create.quantity,
                modifications: Vec::new(),
                note: create.note,
            },
            Err(e) => {
                batch.line_items.record_error();
                tracing::warn!(
                    order_id = %order.id,
                    item = %pick.item.name,
                    code = %ErrorCode::LineItemFailed,
                    cause = %e.code(),
                    error = %e,
                    "Line item skipped"
                );
                return;
            }
        };
        batch.line_items.record_success();

        if let Some(modifier) = modifier {
            let create = ModificationCreate {
                order_id: order.id.clone(),
                line_item_id: line_item.id.clone(),
                modifier_id: modifier.id.clone(),
                name: modifier.name.clone(),
                price: modifier.price,
            };
            match self.add_modification(create).await {
                Ok(m) => line_item.modifications.push(m),
                Err(e) => tracing::warn!(
                    line_item_id = %line_item.id,
                    modifier = %modifier.name,
                    error = %e,
                    "Modification skipped"
                ),
            }
        }

        order.line_items.push(line_item);
    }

    async fn add_modification(&self, create: ModificationCreate) -> SimResult<Modification> {
        let record = self
            .gateway
            .create(EntityType::Modification, to_payload(&create)?)
            .await?;
        Ok(Modification {
            id: Some(record.id),
            modifier_id: create.modifier_id,
            name: create.name,
            price: create.price,
        })
    }

    async fn add_discount(&self, create: AdjustmentCreate) -> SimResult<OrderDiscount> {
        let record = self
            .gateway
            .create(EntityType::OrderDiscount, to_payload(&create)?)
            .await?;
        Ok(OrderDiscount {
            id: Some(record.id),
            name: create.name,
            percentage: create.percentage,
            amount: create.amount,
        })
    }

    async fn add_service_charge(&self, create: AdjustmentCreate) -> SimResult<ServiceCharge> {
        let record = self
            .gateway
            .create(EntityType::ServiceCharge, to_payload(&create)?)
            .await?;
        Ok(ServiceCharge {
            id: Some(record.id),
            name: create.name,
            percentage: create.percentage,
            amount: create.amount,
        })
    }
}

/// `max(1, round(party × 1.5))`, half rounded up
pub fn party_item_count(party_size: u32) -> u32 {
    ((party_size * 3 + 1) / 2).max(1)
}

fn seated_order_time(reservation_time: NaiveDateTime) -> NaiveDateTime {
    offset_minutes(reservation_time, SEATING_DELAY_MINUTES)
}
