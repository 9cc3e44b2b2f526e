//! PaymentSettlement - captures order totals and attaches tips

use crab_client::{EntityType, RemoteEntityGateway, to_payload};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::models::{Order, Payment, PaymentCreate, PaymentMethod, PhaseCounter, TipCreate};
use shared::money::{format_cents, percent_of};
use shared::{Cents, ErrorCode, Percent};
use std::sync::Arc;

use crate::core::{SimResult, SimulationProfile};
use crate::order_money::ValuationError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementBatch {
    pub payments: Vec<Payment>,
    pub captured: PhaseCounter,
    pub tips: PhaseCounter,
}

pub struct PaymentSettlement {
    gateway: Arc<dyn RemoteEntityGateway>,
    profile: SimulationProfile,
}

impl PaymentSettlement {
    pub fn new(gateway: Arc<dyn RemoteEntityGateway>, profile: SimulationProfile) -> Self {
        Self { gateway, profile }
    }

    /// Pay every finalized, non-voided order with a positive total
    pub async fn settle<R: Rng + ?Sized>(&self, orders: &[Order], rng: &mut R) -> SettlementBatch {
        let mut batch = SettlementBatch::default();

        for order in orders {
            let Some(total) = order.total.filter(|_| order.is_payable()) else {
                continue;
            };
            if total <= 0 {
                tracing::debug!(order_id = %order.id, total, "Nothing to capture");
                continue;
            }

            let method = if rng.gen_bool(self.profile.card_probability) {
                PaymentMethod::Card
            } else {
                PaymentMethod::Cash
            };
            let tip_pct = rng
                .gen_bool(self.profile.tip_probability)
                .then(|| self.profile.tip_percent.sample(rng));

            let mut payment = match self.capture(order, total, method).await {
                Ok(p) => p,
                Err(e) => {
                    batch.captured.record_error();
                    tracing::warn!(
                        order_id = %order.id,
                        code = %e.unit_code(ErrorCode::PaymentFailed),
                        cause = %e.code(),
                        error = %e,
                        "Payment failed"
                    );
                    continue;
                }
            };
            batch.captured.record_success();

            if let Some(pct) = tip_pct {
                match self.attach_tip(&payment, total, pct).await {
                    Ok(tip) => {
                        batch.tips.record_success();
                        payment.tip_amount = tip;
                    }
                    Err(e) => {
                        batch.tips.record_error();
                        tracing::warn!(
                            payment_id = %payment.id,
                            code = %e.unit_code(ErrorCode::TipFailed),
                            error = %e,
                            "Tip failed, payment left untipped"
                        );
                    }
                }
            }

            tracing::debug!(
                order_id = %order.id,
                amount = %format_cents(payment.amount),
                tip = %format_cents(payment.tip_amount),
                ?method,
                "Payment captured"
            );
            batch.payments.push(payment);
        }

        tracing::info!(
            payments = batch.captured.success_count,
            failed = batch.captured.error_count,
            tips = batch.tips.success_count,
            "Orders settled"
        );
        batch
    }

    async fn capture(&self, order: &Order, amount: Cents, method: PaymentMethod) -> SimResult<Payment> {
        let create = PaymentCreate {
            order_id: order.id.clone(),
            amount,
            method,
        };
        let record = self
            .gateway
            .create(EntityType::Payment, to_payload(&create)?)
            .await?;
        Ok(Payment {
            id: record.id,
            order_id: create.order_id,
            amount,
            tip_amount: 0,
            method,
        })
    }

    async fn attach_tip(&self, payment: &Payment, total: Cents, pct: Percent) -> SimResult<Cents> {
        let amount = percent_of(total, pct).ok_or(ValuationError::Overflow("tip"))?;
        let create = TipCreate {
            payment_id: payment.id.clone(),
            order_id: payment.order_id.clone(),
            amount,
        };
        self.gateway
            .create(EntityType::Tip, to_payload(&create)?)
            .await?;
        Ok(amount)
    }
}
