use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, Withdrawal, WithdrawalStatus},
    order_objects::{MerchantOrderDetail, WithdrawalView},
    payout_provider::PayoutProvider,
    traits::{OrderManagement, OrderQueryFilter, PaymentGatewayError, WithdrawalManagement},
};

/// Read-mostly views for the merchant: orders, and the withdrawals made for them.
///
/// Listing withdrawals asks the payout provider for the latest status of every withdrawal that is still executing,
/// and settles it if the provider reports a final outcome. A provider that cannot be reached is not an error; the
/// stored status is returned as is.
#[derive(Clone)]
pub struct MerchantApi<B, P> {
    db: B,
    provider: P,
}

impl<B, P> Debug for MerchantApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MerchantApi")
    }
}

impl<B, P> MerchantApi<B, P> {
    pub fn new(db: B, provider: P) -> Self {
        Self { db, provider }
    }
}

impl<B, P> MerchantApi<B, P>
where B: OrderManagement + WithdrawalManagement
{
    pub async fn list_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError> {
        self.db.search_orders(query).await
    }

    pub async fn order_detail(&self, order_id: &OrderId) -> Result<Option<MerchantOrderDetail>, PaymentGatewayError> {
        let Some(order) = self.db.fetch_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.db.fetch_order_items(order_id).await?;
        let withdrawal = self.db.fetch_withdrawal_for_order(order_id).await?;
        Ok(Some(MerchantOrderDetail { order, items, withdrawal }))
    }
}

impl<B, P> MerchantApi<B, P>
where
    B: WithdrawalManagement,
    P: PayoutProvider,
{
    /// All withdrawals, newest first, with executing withdrawals refreshed from the provider.
    pub async fn list_withdrawals(&self) -> Result<Vec<WithdrawalView>, PaymentGatewayError> {
        let withdrawals = self.db.fetch_withdrawals().await?;
        let mut result = Vec::with_capacity(withdrawals.len());
        for withdrawal in withdrawals {
            result.push(self.refresh_withdrawal(withdrawal).await);
        }
        Ok(result)
    }

    /// Brings an `executing` withdrawal up to date with the provider. Other withdrawals are returned untouched.
    pub async fn refresh_withdrawal(&self, withdrawal: Withdrawal) -> WithdrawalView {
        if withdrawal.status != WithdrawalStatus::Executing {
            return withdrawal.into();
        }
        let request_id = withdrawal.provider_payout_request_id.clone();
        let info = match self.provider.get_payout_request(&request_id).await {
            Ok(info) => info,
            Err(e) => {
                warn!("💸️ Could not refresh withdrawal #{} (request {request_id}). {e}", withdrawal.id);
                return withdrawal.into();
            },
        };
        let provider_status = Some(info.status.to_string());
        let payouts = info.payouts;
        let Some(next) = info.status.settled_withdrawal_status() else {
            trace!("💸️ Withdrawal #{} is still executing ({})", withdrawal.id, info.status);
            return WithdrawalView { withdrawal, provider_status, payouts };
        };
        let withdrawal = match self.db.transition_withdrawal(withdrawal.id, WithdrawalStatus::Executing, next).await {
            Ok(Some(updated)) => {
                info!("💸️ Withdrawal #{} for order [{}] is {next}", updated.id, updated.order_id);
                updated
            },
            Ok(None) => {
                debug!("💸️ Withdrawal #{} was settled concurrently", withdrawal.id);
                withdrawal
            },
            Err(e) => {
                warn!("💸️ Could not update withdrawal #{} to {next}. {e}", withdrawal.id);
                withdrawal
            },
        };
        WithdrawalView { withdrawal, provider_status, payouts }
    }
}
