use std::str::FromStr;

use serde::{Deserialize, Serialize};
use upg_common::MicroUsdc;
use usdc_payment_engine::{
    db_types::{OrderId, OrderStatusType, ProductId},
    order_objects::CheckoutItem,
    OrderQueryFilter,
};

use crate::errors::ServerError;

/// The webhook event type that signals an inbound deposit
pub const ACCOUNT_CREDITED: &str = "account_credited";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(alias = "customer_email")]
    pub customer_email: String,
    pub items: Vec<CheckoutLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    #[serde(alias = "product_id")]
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CheckoutRequest {
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.items.iter().map(|line| CheckoutItem::new(line.product_id.clone(), line.quantity)).collect()
    }
}

//----------------------------------------------   Webhooks  ----------------------------------------------------

/// The parts of a Mural balance activity event that the gateway cares about. Everything else in the payload is
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuralWebhookEvent {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub token: Option<WebhookToken>,
    #[serde(default)]
    pub transaction_details: Option<WebhookTransactionDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookToken {
    #[serde(default, deserialize_with = "upg_common::decimal::deserialize_opt")]
    pub token_amount: Option<MicroUsdc>,
    #[serde(default)]
    pub token_symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookTransactionDetails {
    #[serde(default)]
    pub hash: Option<String>,
}

impl MuralWebhookEvent {
    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or("unknown")
    }

    /// The credited amount and transaction hash, if this is a deposit notification that carries an amount.
    pub fn credited_deposit(&self) -> Option<(MicroUsdc, &str)> {
        if self.event_type() != ACCOUNT_CREDITED {
            return None;
        }
        let amount = self.token.as_ref()?.token_amount?;
        let hash = self.transaction_details.as_ref().and_then(|d| d.hash.as_deref()).unwrap_or_default();
        Some((amount, hash))
    }
}

/// Webhook deliveries are always acknowledged with this body, so that the provider does not retry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn received() -> Self {
        Self { received: true, matched: None, order_id: None, error: None }
    }

    pub fn routed(order_id: Option<OrderId>) -> Self {
        Self { matched: Some(order_id.is_some()), order_id, ..Self::received() }
    }

    pub fn rejected<S: Into<String>>(error: S) -> Self {
        Self { error: Some(error.into()), ..Self::received() }
    }
}

//----------------------------------------------   Merchant  ----------------------------------------------------

/// Query string for `/merchant/orders`, e.g. `?status=paid,withdrawal_failed&limit=20`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantOrderQuery {
    pub status: Option<String>,
    pub customer_email: Option<String>,
    pub limit: Option<i64>,
}

impl TryFrom<MerchantOrderQuery> for OrderQueryFilter {
    type Error = ServerError;

    fn try_from(query: MerchantOrderQuery) -> Result<Self, Self::Error> {
        let mut filter = OrderQueryFilter::default();
        if let Some(statuses) = query.status {
            for s in statuses.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let status = OrderStatusType::from_str(s).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
                filter = filter.with_status(status);
            }
        }
        if let Some(email) = query.customer_email {
            filter = filter.with_customer_email(email);
        }
        if let Some(limit) = query.limit {
            if limit <= 0 {
                return Err(ServerError::InvalidRequestBody("limit must be positive".into()));
            }
            filter = filter.with_limit(limit);
        }
        Ok(filter)
    }
}
