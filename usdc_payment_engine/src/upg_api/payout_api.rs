use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewWithdrawal, Order, OrderId, OrderStatusType, Withdrawal},
    payout_provider::{PayoutProvider, PayoutRecipient},
    traits::{PaymentGatewayDatabase, WithdrawalManagement},
    PayoutError,
};

/// The merchant's side of every payout.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutConfig {
    /// The provider account that receives the customer deposits and funds the payouts.
    pub source_account_id: String,
    pub recipient: PayoutRecipient,
}

/// `PayoutApi` converts paid orders into fiat payouts.
///
/// A conversion claims the order by moving it from `paid` to `withdrawal_initiated`, then creates and executes a
/// payout request with the provider, and finally records a [`Withdrawal`]. If any step after the claim fails, the
/// order ends up in `withdrawal_failed` and no withdrawal is recorded.
#[derive(Clone)]
pub struct PayoutApi<B, P> {
    db: B,
    provider: P,
    config: PayoutConfig,
}

impl<B, P> Debug for PayoutApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayoutApi (source account {})", self.config.source_account_id)
    }
}

impl<B, P> PayoutApi<B, P> {
    pub fn new(db: B, provider: P, config: PayoutConfig) -> Self {
        Self { db, provider, config }
    }
}

impl<B, P> PayoutApi<B, P>
where
    B: PaymentGatewayDatabase + WithdrawalManagement,
    P: PayoutProvider,
{
    /// Converts the deposit for a paid order into a fiat payout.
    ///
    /// Returns [`PayoutError::TransitionNotApplied`] without side effects if the order is not `paid` (e.g. another
    /// task is already converting it). Every other error leaves the order in `withdrawal_failed`.
    pub async fn convert(&self, order: &Order) -> Result<Withdrawal, PayoutError> {
        let order = self
            .db
            .transition_order(&order.id, OrderStatusType::Paid, OrderStatusType::WithdrawalInitiated)
            .await?
            .ok_or_else(|| PayoutError::TransitionNotApplied(order.id.clone()))?;
        info!("💸️ Starting payout for order [{}]", order.id);
        match self.stage_and_execute(&order).await {
            Ok(withdrawal) => {
                info!(
                    "💸️ Payout for order [{}] is executing. {} via request {}",
                    order.id, withdrawal.amount, withdrawal.provider_payout_request_id
                );
                Ok(withdrawal)
            },
            Err(e) => {
                self.mark_failed(&order.id, &e).await;
                Err(e)
            },
        }
    }

    async fn stage_and_execute(&self, order: &Order) -> Result<Withdrawal, PayoutError> {
        let amount = order.fingerprint_amount.truncate_to_cents();
        if !amount.is_positive() {
            return Err(PayoutError::InvalidPayoutAmount(amount));
        }
        let request_id =
            self.provider.create_payout_request(&self.config.source_account_id, amount, &self.config.recipient).await?;
        debug!("💸️ Payout request {request_id} created for order [{}] ({amount})", order.id);
        let status = self.provider.execute_payout_request(&request_id).await?;
        debug!("💸️ Payout request {request_id} executed. Provider status: {status}");
        let withdrawal = NewWithdrawal::executing(order.id.clone(), request_id, amount);
        let withdrawal = self.db.insert_withdrawal(withdrawal).await?;
        Ok(withdrawal)
    }

    async fn mark_failed(&self, order_id: &OrderId, cause: &PayoutError) {
        error!("💸️ Payout for order [{order_id}] failed. {cause}");
        let result = self
            .db
            .transition_order(order_id, OrderStatusType::WithdrawalInitiated, OrderStatusType::WithdrawalFailed)
            .await;
        match result {
            Ok(Some(_)) => info!("💸️ Order [{order_id}] marked as withdrawal_failed"),
            Ok(None) => warn!("💸️ Order [{order_id}] was no longer withdrawal_initiated, so it was not marked as failed"),
            Err(e) => error!("💸️ Could not mark order [{order_id}] as withdrawal_failed. {e}"),
        }
    }

    /// Event handler entry point for [`crate::events::OrderPaidEvent`]. The outcome is logged and recorded as order
    /// state, so nothing is returned to the (long gone) caller other than the withdrawal, if one was made.
    pub async fn process_paid_order(&self, order: Order) -> Option<Withdrawal> {
        match self.convert(&order).await {
            Ok(withdrawal) => Some(withdrawal),
            Err(PayoutError::TransitionNotApplied(id)) => {
                info!("💸️ Order [{id}] has already been picked up for conversion. Skipping.");
                None
            },
            // Already logged and recorded by `convert`
            Err(_) => None,
        }
    }
}
