use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db_types::{MicroUsdc, Order, OrderId, OrderItem, OrderStatusType, ProductId, Withdrawal};

/// One line of a checkout cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CheckoutItem {
    pub fn new<P: Into<ProductId>>(product_id: P, quantity: i64) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

/// What a customer needs to know to pay for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    #[serde(with = "upg_common::decimal")]
    pub total_amount: MicroUsdc,
    /// Deposit exactly this amount, or the payment cannot be matched to the order.
    #[serde(with = "upg_common::decimal")]
    pub fingerprint_amount: MicroUsdc,
    pub deposit_address: String,
    pub network: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// The merchant's view of an order, including the payout made for it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantOrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub withdrawal: Option<Withdrawal>,
}

/// What became of an inbound deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The deposit paid for this order. A payout has been dispatched.
    Matched(Order),
    /// The deposit transaction has already been used to pay an order.
    Duplicate,
    /// No pending order is waiting for this amount.
    NoMatch,
}

impl DepositOutcome {
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            Self::Matched(order) => Some(&order.id),
            _ => None,
        }
    }
}

/// A withdrawal, as refreshed from the payout provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalView {
    #[serde(flatten)]
    pub withdrawal: Withdrawal,
    /// The provider's own status string, when the provider was asked and answered.
    pub provider_status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub payouts: Vec<Value>,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(withdrawal: Withdrawal) -> Self {
        Self { withdrawal, provider_status: None, payouts: Vec::new() }
    }
}
