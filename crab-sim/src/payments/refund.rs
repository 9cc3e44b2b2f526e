//! RefundProcessor - full / partial refunds of captured payments
//!
//! The originating payment is looked up remotely (first payment filtered by
//! `order_id`), so a refund is only ever issued against what the system of
//! record actually holds. A refund never exceeds its payment.

use crab_client::{EntityType, Filter, ListQuery, RemoteEntityGateway, to_payload};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use shared::{Cents, ErrorCode};
use shared::models::{Order, Payment, PhaseCounter, Refund, RefundCreate, RefundKind};
use shared::money::{format_cents, percent_of};
use std::sync::Arc;

use crate::core::{SimResult, SimulationProfile};
use crate::order_money::ValuationError;
use crate::setup::standard::REFUND_REASONS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefundBatch {
    pub refunds: Vec<Refund>,
    pub issued: PhaseCounter,
    /// Sampled orders without a payment
    pub skipped: u32,
}

pub struct RefundProcessor {
    gateway: Arc<dyn RemoteEntityGateway>,
    profile: SimulationProfile,
}

impl RefundProcessor {
    pub fn new(gateway: Arc<dyn RemoteEntityGateway>, profile: SimulationProfile) -> Self {
        Self { gateway, profile }
    }

    /// Refund a random sample of the day's payable orders
    pub async fn process<R: Rng + ?Sized>(&self, orders: &[Order], rng: &mut R) -> RefundBatch {
        let mut batch = RefundBatch::default();

        let candidates: Vec<&Order> = orders.iter().filter(|o| o.is_payable()).collect();
        let count = self.profile.refunds_per_day.sample(rng) as usize;
        let sample: Vec<&Order> = candidates
            .choose_multiple(rng, count.min(candidates.len()))
            .copied()
            .collect();

        for order in sample {
            let full = rng.gen_bool(self.profile.full_refund_probability);
            let partial_pct = self.profile.partial_refund_percent.sample(rng);
            let reason = REFUND_REASONS.choose(rng).copied().unwrap_or("Other");

            let payment = match self.first_payment(&order.id).await {
                Ok(Some(p)) => p,
                Ok(None) => {
                    batch.skipped += 1;
                    tracing::debug!(order_id = %order.id, "No payment, refund skipped");
                    continue;
                }
                Err(e) => {
                    batch.issued.record_error();
                    tracing::warn!(
                        order_id = %order.id,
                        code = %e.unit_code(ErrorCode::RefundFailed),
                        error = %e,
                        "Payment lookup failed"
                    );
                    continue;
                }
            };

            let (kind, amount) = if full {
                (RefundKind::Full, payment.amount)
            } else {
                let total = order.total.unwrap_or(payment.amount);
                match percent_of(total, partial_pct) {
                    Some(amount) => (RefundKind::Partial, amount.min(payment.amount)),
                    None => {
                        batch.issued.record_error();
                        let e = ValuationError::Overflow("partial refund");
                        tracing::warn!(order_id = %order.id, code = %ErrorCode::RefundFailed, error = %e, "Refund skipped");
                        continue;
                    }
                }
            };

            match self.issue(&payment, amount, reason, kind).await {
                Ok(refund) => {
                    batch.issued.record_success();
                    tracing::debug!(
                        order_id = %order.id,
                        amount = %format_cents(refund.amount),
                        ?kind,
                        reason,
                        "Refund issued"
                    );
                    batch.refunds.push(refund);
                }
                Err(e) => {
                    batch.issued.record_error();
                    tracing::warn!(
                        order_id = %order.id,
                        code = %e.unit_code(ErrorCode::RefundFailed),
                        cause = %e.code(),
                        error = %e,
                        "Refund failed"
                    );
                }
            }
        }

        tracing::info!(
            refunds = batch.issued.success_count,
            failed = batch.issued.error_count,
            skipped = batch.skipped,
            "Refunds processed"
        );
        batch
    }

    async fn first_payment(&self, order_id: &str) -> SimResult<Option<Payment>> {
        let query = ListQuery::new()
            .limit(1)
            .filter(Filter::eq("order_id", order_id));
        let records = self.gateway.list(EntityType::Payment, &query).await?;
        match records.first() {
            Some(record) => Ok(Some(record.parse()?)),
            None => Ok(None),
        }
    }

    async fn issue(
        &self,
        payment: &Payment,
        amount: Cents,
        reason: &str,
        kind: RefundKind,
    ) -> SimResult<Refund> {
        let create = RefundCreate {
            payment_id: payment.id.clone(),
            order_id: payment.order_id.clone(),
            amount,
            reason: reason.to_string(),
            kind,
        };
        let record = self
            .gateway
            .create(EntityType::Refund, to_payload(&create)?)
            .await?;
        Ok(Refund {
            id: record.id,
            payment_id: create.payment_id,
            order_id: create.order_id,
            amount,
            reason: create.reason,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CountRange;
    use crab_client::{FailureKind, MemoryGateway, Operation};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use shared::models::{OrderSource, OrderState};

    fn order(id: &str, total: Cents) -> Order {
        Order {
            id: id.into(),
            source: OrderSource::WalkIn,
            state: OrderState::Open,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            employee_id: None,
            customer_id: None,
            table_id: None,
            reservation_id: None,
            line_items: vec![],
            discounts: vec![],
            service_charges: vec![],
            tax_rates: vec![],
            total: Some(total),
        }
    }

    fn paid(gw: &MemoryGateway, order: &Order) {
        gw.seed(
            EntityType::Payment,
            json!({"order_id": order.id, "amount": order.total, "method": "CARD"}),
        )
        .unwrap();
    }

    fn profile(count: u32, full: f64) -> SimulationProfile {
        SimulationProfile {
            refunds_per_day: CountRange::exactly(count),
            full_refund_probability: full,
            ..SimulationProfile::default()
        }
    }

    #[tokio::test]
    async fn test_full_refund_equals_payment() {
        let gw = Arc::new(MemoryGateway::new());
        let orders = vec![order("OR-1", 1080)];
        paid(&gw, &orders[0]);
        let processor = RefundProcessor::new(gw.clone(), profile(1, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        let batch = processor.process(&orders, &mut rng).await;
        assert_eq!(batch.refunds.len(), 1);
        assert_eq!(batch.refunds[0].kind, RefundKind::Full);
        assert_eq!(batch.refunds[0].amount, 1080);
        assert!(REFUND_REASONS.contains(&batch.refunds[0].reason.as_str()));
        assert_eq!(gw.records(EntityType::Refund).len(), 1);
    }

    #[tokio::test]
    async fn test_partial_refunds_are_bounded() {
        let gw = Arc::new(MemoryGateway::new());
        let orders: Vec<_> = (0..10).map(|i| order(&format!("OR-{}", i), 999 + i)).collect();
        for o in &orders {
            paid(&gw, o);
        }
        let processor = RefundProcessor::new(gw, profile(10, 0.0));
        let mut rng = StdRng::seed_from_u64(4);

        let batch = processor.process(&orders, &mut rng).await;
        assert_eq!(batch.refunds.len(), 10);
        for refund in &batch.refunds {
            let total = orders.iter().find(|o| o.id == refund.order_id).unwrap().total.unwrap();
            assert_eq!(refund.kind, RefundKind::Partial);
            assert!(refund.amount <= total);
            assert!(refund.amount >= percent_of(total, 25).unwrap());
            assert!(refund.amount <= percent_of(total, 74).unwrap());
        }
    }

    #[tokio::test]
    async fn test_sample_never_exceeds_orders() {
        let gw = Arc::new(MemoryGateway::new());
        let orders = vec![order("OR-1", 500), order("OR-2", 700)];
        for o in &orders {
            paid(&gw, o);
        }
        let processor = RefundProcessor::new(gw, profile(3, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        let batch = processor.process(&orders, &mut rng).await;
        assert_eq!(batch.refunds.len(), 2);
        assert_ne!(batch.refunds[0].order_id, batch.refunds[1].order_id);
    }

    #[tokio::test]
    async fn test_order_without_payment_is_skipped() {
        let gw = Arc::new(MemoryGateway::new());
        let processor = RefundProcessor::new(gw.clone(), profile(1, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        let batch = processor.process(&[order("OR-1", 1080)], &mut rng).await;
        assert!(batch.refunds.is_empty());
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.issued, PhaseCounter::default());
        assert_eq!(gw.total_creates(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_counted() {
        let gw = Arc::new(MemoryGateway::new());
        gw.fail_always(EntityType::Payment, Operation::List, FailureKind::Transient);
        let processor = RefundProcessor::new(gw, profile(1, 1.0));
        let mut rng = StdRng::seed_from_u64(1);

        let batch = processor.process(&[order("OR-1", 1080)], &mut rng).await;
        assert_eq!(batch.issued.error_count, 1);
        assert!(batch.refunds.is_empty());
    }
}
