//! Payment, Tip and Refund Models

use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
}

/// Primary payment of an order (at most one per order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount: Cents,
    #[serde(default)]
    pub tip_amount: Cents,
    pub method: PaymentMethod,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: String,
    pub amount: Cents,
    pub method: PaymentMethod,
}

/// Attach tip payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipCreate {
    pub payment_id: String,
    pub order_id: String,
    pub amount: Cents,
}

/// Refund kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundKind {
    Full,
    Partial,
}

/// Refund record; `amount` never exceeds the originating payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub payment_id: String,
    pub order_id: String,
    pub amount: Cents,
    pub reason: String,
    pub kind: RefundKind,
}

/// Create refund payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCreate {
    pub payment_id: String,
    pub order_id: String,
    pub amount: Cents,
    pub reason: String,
    pub kind: RefundKind,
}
