//! Amount fingerprinting.
//!
//! All customers pay into the same deposit address, so the only thing that ties a deposit to an order is its amount.
//! Each pending order is therefore given a *fingerprint amount*: the order total plus a random offset of 1 to 999
//! micro-USDC. Order totals are whole cents (10,000 micro-USDC), so the offset never reaches the next cent and the
//! customer pays at most a fraction of a cent extra.
//!
//! The allocator samples an offset, skips it if a pending order already holds that amount, and otherwise tries to
//! insert the order. The database's partial unique index on pending fingerprints is what actually guarantees
//! uniqueness; a concurrent insert that wins the race simply costs the loser one attempt.
use std::{fmt::Debug, sync::Arc};

use log::*;
use rand::Rng;

use crate::{
    db_types::{MicroUsdc, NewOrder, Order},
    traits::{InsertOrderResult, OrderManagement, PaymentGatewayDatabase},
    OrderFlowError,
};

pub const MAX_ALLOCATION_ATTEMPTS: usize = 50;
pub const MIN_OFFSET: i64 = 1;
pub const MAX_OFFSET: i64 = 999;

/// Produces fingerprint offsets, in micro-USDC. Must return values in `[MIN_OFFSET, MAX_OFFSET]`.
pub type OffsetSource = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct FingerprintAllocator {
    offsets: OffsetSource,
    max_attempts: usize,
}

impl Debug for FingerprintAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FingerprintAllocator(max_attempts: {})", self.max_attempts)
    }
}

impl Default for FingerprintAllocator {
    fn default() -> Self {
        Self::new(Arc::new(|| rand::thread_rng().gen_range(MIN_OFFSET..=MAX_OFFSET)))
    }
}

impl FingerprintAllocator {
    pub fn new(offsets: OffsetSource) -> Self {
        Self { offsets, max_attempts: MAX_ALLOCATION_ATTEMPTS }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns a candidate fingerprint for `total`.
    pub fn sample(&self, total: MicroUsdc) -> Result<MicroUsdc, OrderFlowError> {
        let offset = (self.offsets)().clamp(MIN_OFFSET, MAX_OFFSET);
        total
            .checked_add(MicroUsdc::from(offset))
            .ok_or_else(|| OrderFlowError::ValidationError(format!("Order total {total} is too large")))
    }

    /// Finds a free fingerprint for the order and stores it as `pending_payment`.
    ///
    /// Gives up with [`OrderFlowError::AllocationExhausted`] after `max_attempts` collisions.
    pub async fn allocate_and_insert<B>(&self, db: &B, order: NewOrder) -> Result<Order, OrderFlowError>
    where B: OrderManagement + PaymentGatewayDatabase {
        for attempt in 1..=self.max_attempts {
            let candidate = self.sample(order.total_amount)?;
            if db.fetch_pending_order_by_fingerprint(candidate).await?.is_some() {
                trace!("🔄️🔢️ Fingerprint {candidate} is in use (attempt {attempt})");
                continue;
            }
            match db.insert_order(order.clone().with_fingerprint(candidate)).await? {
                InsertOrderResult::Inserted(order) => {
                    debug!("🔄️🔢️ Order [{}] allocated fingerprint {candidate} after {attempt} attempt(s)", order.id);
                    return Ok(order);
                },
                InsertOrderResult::FingerprintTaken => {
                    debug!("🔄️🔢️ Fingerprint {candidate} was taken by a concurrent order (attempt {attempt})");
                },
            }
        }
        warn!(
            "🔄️🔢️ Could not find a free fingerprint for a {} order after {} attempts",
            order.total_amount, self.max_attempts
        );
        Err(OrderFlowError::AllocationExhausted(self.max_attempts))
    }
}
