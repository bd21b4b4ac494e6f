//! Glue between the payment engine and the Mural Pay API.
//!
//! [`MuralPayoutProvider`] adapts [`MuralApi`] to the engine's [`PayoutProvider`] trait, and
//! [`create_payout_event_handlers`] wires the `OrderPaid` event to the payout conversion.
use log::*;
use mural_tools::{
    FiatPayoutDetails,
    MuralApi,
    MuralApiError,
    MuralConfig,
    PayoutAmount,
    PayoutBody,
    PayoutRequestBody,
    PhysicalAddress,
    RecipientInfo,
};
use upg_common::MicroUsdc;
use usdc_payment_engine::{
    events::{EventHandlers, EventHooks},
    PayoutApi,
    PayoutConfig,
    PayoutProvider,
    PayoutProviderError,
    PayoutRecipient,
    PayoutRequestInfo,
    PayoutRequestStatus,
    SqliteDatabase,
};

pub const PAYOUT_EVENT_BUFFER_SIZE: usize = 25;
pub const PAYOUT_MEMO: &str = "Auto-conversion to COP";

#[derive(Clone)]
pub struct MuralPayoutProvider {
    api: MuralApi,
}

impl MuralPayoutProvider {
    pub fn new(config: MuralConfig) -> Result<Self, MuralApiError> {
        let api = MuralApi::new(config)?;
        Ok(Self { api })
    }
}

impl PayoutProvider for MuralPayoutProvider {
    async fn create_payout_request(
        &self,
        source_account_id: &str,
        amount: MicroUsdc,
        recipient: &PayoutRecipient,
    ) -> Result<String, PayoutProviderError> {
        let body = payout_request_body(source_account_id, amount, recipient);
        let request = self.api.create_payout_request(&body).await.map_err(provider_error)?;
        Ok(request.id)
    }

    async fn execute_payout_request(&self, request_id: &str) -> Result<PayoutRequestStatus, PayoutProviderError> {
        let request = self.api.execute_payout_request(request_id).await.map_err(provider_error)?;
        Ok(PayoutRequestStatus::from_provider(&request.status))
    }

    async fn get_payout_request(&self, request_id: &str) -> Result<PayoutRequestInfo, PayoutProviderError> {
        let request = self.api.get_payout_request(request_id).await.map_err(provider_error)?;
        let status = PayoutRequestStatus::from_provider(&request.status);
        Ok(PayoutRequestInfo { id: request.id, status, payouts: request.payouts })
    }
}

/// Builds a single-payout request that sends `amount` USDC to the merchant's bank account.
pub fn payout_request_body(source_account_id: &str, amount: MicroUsdc, recipient: &PayoutRecipient) -> PayoutRequestBody {
    let address = &recipient.physical_address;
    let physical_address = PhysicalAddress {
        address1: address.address1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        country: address.country.clone(),
        zip: address.zip.clone(),
    };
    let payout = PayoutBody {
        amount: PayoutAmount::usdc(amount),
        recipient_info: RecipientInfo::individual(
            recipient.first_name.clone(),
            recipient.last_name.clone(),
            recipient.email.clone(),
            physical_address,
        ),
        payout_details: FiatPayoutDetails::new(
            recipient.bank_name.clone(),
            recipient.bank_account_owner.clone(),
            recipient.fiat_and_rail_details.clone(),
        ),
    };
    PayoutRequestBody {
        source_account_id: source_account_id.to_string(),
        memo: PAYOUT_MEMO.to_string(),
        payouts: vec![payout],
    }
}

fn provider_error(e: MuralApiError) -> PayoutProviderError {
    match e {
        MuralApiError::Timeout => PayoutProviderError::Timeout,
        MuralApiError::QueryError { status, message } => PayoutProviderError::Rejected { status, message },
        MuralApiError::RestRequestError(s) | MuralApiError::Initialization(s) => PayoutProviderError::Unavailable(s),
        MuralApiError::RestResponseError(s) | MuralApiError::JsonError(s) => PayoutProviderError::InvalidResponse(s),
    }
}

/// Creates the event handlers that convert every paid order into a payout.
///
/// The conversion runs on the event handler's task, so the webhook that reported the deposit never waits on Mural.
pub fn create_payout_event_handlers(db: SqliteDatabase, provider: MuralPayoutProvider, config: PayoutConfig) -> EventHandlers {
    let mut hooks = EventHooks::default();
    let payouts = PayoutApi::new(db, provider, config);
    hooks.on_order_paid(move |ev| {
        let payouts = payouts.clone();
        debug!("💸️ Order [{}] has been paid. Dispatching payout.", ev.order.id);
        Box::pin(async move {
            // Failures are logged and recorded against the order by the payout API
            let _ = payouts.process_paid_order(ev.order).await;
        })
    });
    EventHandlers::new(PAYOUT_EVENT_BUFFER_SIZE, hooks)
}
