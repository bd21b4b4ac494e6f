use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// The result of trying to store a new pending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// Another pending order already holds this fingerprint amount. Nothing was written.
    FingerprintTaken,
}

/// The result of trying to claim a pending order with an inbound deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDepositResult {
    /// The order was moved to `paid` and the transaction hash recorded against it.
    Matched(Order),
    /// The transaction hash has already been used to pay an order.
    AlreadyProcessed,
    /// There is no pending order with this fingerprint amount.
    NoMatch,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub customer_email: Option<String>,
    pub statuses: Option<Vec<OrderStatusType>>,
    /// Only return orders that have not been touched for at least this long.
    #[serde(skip)]
    pub idle_for: Option<Duration>,
    pub limit: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_idle_for(mut self, idle_for: Duration) -> Self {
        self.idle_for = Some(idle_for);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none() &&
            self.statuses.as_ref().map(|s| s.is_empty()).unwrap_or(true) &&
            self.idle_for.is_none()
    }
}
