use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use upg_common::MicroUsdc;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh, random (v4 UUID) order id.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConversionError("Order id cannot be empty".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       ProductId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle of an order.
///
/// ```text
/// pending_payment ──> paid ──> withdrawal_initiated ──> withdrawal_failed
/// ```
///
/// A successful payout is recorded on the [`Withdrawal`], so `withdrawal_initiated` is the last status a healthy
/// order ever has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been created and is waiting for a deposit of exactly its fingerprint amount.
    PendingPayment,
    /// A matching deposit was received.
    Paid,
    /// Conversion of the deposit into a fiat payout has started.
    WithdrawalInitiated,
    /// The payout could not be staged or executed.
    WithdrawalFailed,
}

impl OrderStatusType {
    /// Returns true if the order lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!((self, next), (PendingPayment, Paid) | (Paid, WithdrawalInitiated) | (WithdrawalInitiated, WithdrawalFailed))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::WithdrawalFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::PendingPayment => "pending_payment",
            OrderStatusType::Paid => "paid",
            OrderStatusType::WithdrawalInitiated => "withdrawal_initiated",
            OrderStatusType::WithdrawalFailed => "withdrawal_failed",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "withdrawal_initiated" => Ok(Self::WithdrawalInitiated),
            "withdrawal_failed" => Ok(Self::WithdrawalFailed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to pending_payment");
            OrderStatusType::PendingPayment
        })
    }
}

//--------------------------------------   WithdrawalStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    /// The provider accepted and executed the payout request; settlement is under way.
    Executing,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!((self, next), (Pending, Executing) | (Executing, Completed) | (Executing, Failed))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Completed | WithdrawalStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Executing => "executing",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Failed => "failed",
        }
    }
}

impl Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "executing" => Ok(Self::Executing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid withdrawal status: {s}"))),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "upg_common::decimal")]
    pub price: MicroUsdc,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: MicroUsdc,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: MicroUsdc) -> Self {
        Self { id: ProductId::random(), name: name.into(), description: None, price }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_email: String,
    pub status: OrderStatusType,
    /// The order total, in whole cents
    #[serde(with = "upg_common::decimal")]
    pub total_amount: MicroUsdc,
    /// The exact amount the customer must deposit. `total_amount` plus a unique sub-cent offset.
    #[serde(with = "upg_common::decimal")]
    pub fingerprint_amount: MicroUsdc,
    pub deposit_address: String,
    /// The on-chain transaction that paid for this order. Immutable once set.
    pub deposit_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// The catalog price at the time the order was placed
    #[serde(with = "upg_common::decimal")]
    pub unit_price: MicroUsdc,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub customer_email: String,
    pub total_amount: MicroUsdc,
    pub fingerprint_amount: MicroUsdc,
    pub deposit_address: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: MicroUsdc,
}

impl NewOrder {
    pub fn new<S: Into<String>>(customer_email: S, total_amount: MicroUsdc, deposit_address: S) -> Self {
        Self {
            id: OrderId::random(),
            customer_email: customer_email.into(),
            total_amount,
            fingerprint_amount: total_amount,
            deposit_address: deposit_address.into(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<NewOrderItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint_amount: MicroUsdc) -> Self {
        self.fingerprint_amount = fingerprint_amount;
        self
    }
}

//--------------------------------------       Withdrawal      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    pub order_id: OrderId,
    pub provider_payout_request_id: String,
    /// The fiat payout amount (the deposit truncated to whole cents)
    #[serde(with = "upg_common::decimal")]
    pub amount: MicroUsdc,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub order_id: OrderId,
    pub provider_payout_request_id: String,
    pub amount: MicroUsdc,
    pub status: WithdrawalStatus,
}

impl NewWithdrawal {
    /// A withdrawal is only recorded once the provider has accepted and executed the payout request, so new
    /// withdrawals start out as `executing`.
    pub fn executing(order_id: OrderId, provider_payout_request_id: String, amount: MicroUsdc) -> Self {
        Self { order_id, provider_payout_request_id, amount, status: WithdrawalStatus::Executing }
    }
}
