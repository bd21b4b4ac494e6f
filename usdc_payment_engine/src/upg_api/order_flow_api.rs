use std::{collections::HashMap, fmt::Debug};

use chrono::Duration;
use log::*;

use crate::{
    db_types::{MicroUsdc, NewOrder, NewOrderItem, OrderId, OrderStatusType, Product, ProductId},
    events::{EventProducers, OrderPaidEvent},
    order_objects::{CheckoutItem, CheckoutResult, DepositOutcome, OrderDetail},
    traits::{CatalogManagement, ClaimDepositResult, OrderManagement, OrderQueryFilter, PaymentGatewayDatabase},
    FingerprintAllocator,
    OrderFlowError,
};

pub const DEFAULT_DEPOSIT_NETWORK: &str = "Polygon";

/// Where customers send their USDC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositConfig {
    pub deposit_address: String,
    pub network: String,
}

impl DepositConfig {
    pub fn new<S: Into<String>>(deposit_address: S) -> Self {
        Self { deposit_address: deposit_address.into(), network: DEFAULT_DEPOSIT_NETWORK.to_string() }
    }

    pub fn with_network<S: Into<String>>(mut self, network: S) -> Self {
        self.network = network.into();
        self
    }

    pub fn instructions(&self, amount: MicroUsdc) -> String {
        format!("Send exactly {amount} USDC to {} on {}", self.deposit_address, self.network)
    }
}

/// `OrderFlowApi` is the primary API for handling checkouts and inbound deposits.
///
/// * [`Self::create_order`] prices a cart, allocates a unique fingerprint amount and stores the order as
///   `pending_payment`.
/// * [`Self::handle_deposit`] matches a credited deposit to its order, marks it paid and emits an
///   [`OrderPaidEvent`]. The payout itself happens elsewhere, in response to that event.
#[derive(Clone)]
pub struct OrderFlowApi<B> {
    db: B,
    deposit: DepositConfig,
    allocator: FingerprintAllocator,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.deposit.deposit_address)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, deposit: DepositConfig, producers: EventProducers) -> Self {
        Self { db, deposit, allocator: FingerprintAllocator::default(), producers }
    }

    pub fn with_allocator(mut self, allocator: FingerprintAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn deposit_config(&self) -> &DepositConfig {
        &self.deposit
    }
}

impl<B> OrderFlowApi<B>
where B: CatalogManagement + OrderManagement + PaymentGatewayDatabase
{
    /// Prices the cart against the current catalog and stores a new pending order for it.
    ///
    /// Fails with a validation error if the email is blank, the cart is empty, any quantity is less than one or any
    /// product does not exist. The total is the sum of `price × quantity`, rounded to whole cents.
    pub async fn create_order(
        &self,
        customer_email: &str,
        items: &[CheckoutItem],
    ) -> Result<CheckoutResult, OrderFlowError> {
        let customer_email = customer_email.trim();
        if customer_email.is_empty() {
            return Err(OrderFlowError::ValidationError("A customer email is required".into()));
        }
        if items.is_empty() {
            return Err(OrderFlowError::ValidationError("The cart is empty".into()));
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(OrderFlowError::ValidationError(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        let mut ids = items.iter().map(|i| i.product_id.clone()).collect::<Vec<ProductId>>();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        let catalog = self
            .db
            .fetch_products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect::<HashMap<ProductId, Product>>();

        let mut order_items = Vec::with_capacity(items.len());
        let mut subtotal = MicroUsdc::default();
        for item in items {
            let product = catalog.get(&item.product_id).ok_or_else(|| {
                OrderFlowError::ValidationError(format!("Product {} does not exist", item.product_id))
            })?;
            subtotal = product
                .price
                .checked_mul(item.quantity)
                .and_then(|line| subtotal.checked_add(line))
                .ok_or_else(|| OrderFlowError::ValidationError("The order total is too large".into()))?;
            order_items.push(NewOrderItem {
                product_id: product.id.clone(),
                quantity: item.quantity,
                unit_price: product.price,
            });
        }
        let total = subtotal
            .checked_round_to_cents()
            .ok_or_else(|| OrderFlowError::ValidationError("The order total is too large".into()))?;
        if !total.is_positive() {
            return Err(OrderFlowError::ValidationError(format!("The order total {subtotal} rounds to zero")));
        }

        let new_order =
            NewOrder::new(customer_email, total, self.deposit.deposit_address.as_str()).with_items(order_items);
        let order = self.allocator.allocate_and_insert(&self.db, new_order).await?;
        info!(
            "🔄️📦️ Order [{}] created for {} with {} items. Total {}, awaiting {}",
            order.id,
            order.customer_email,
            items.len(),
            order.total_amount,
            order.fingerprint_amount
        );
        Ok(CheckoutResult {
            instructions: self.deposit.instructions(order.fingerprint_amount),
            order_id: order.id,
            status: order.status,
            total_amount: order.total_amount,
            fingerprint_amount: order.fingerprint_amount,
            deposit_address: order.deposit_address,
            network: self.deposit.network.clone(),
        })
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    pub async fn get_order(&self, order_id: &OrderId) -> Result<OrderDetail, OrderFlowError> {
        let order =
            self.db.fetch_order(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Emits a fresh [`OrderPaidEvent`] for every order that has been sitting in `paid` for longer than `idle_for`.
    ///
    /// Normally the payout starts as soon as the order is paid. An order that is still `paid` after a while was
    /// dropped on the way (most likely by a restart) and needs another nudge. Conversion only proceeds from `paid`,
    /// so re-sending the event is harmless.
    pub async fn republish_stale_paid_orders(&self, idle_for: Duration) -> Result<usize, OrderFlowError> {
        let query = OrderQueryFilter::default().with_status(OrderStatusType::Paid).with_idle_for(idle_for);
        let stale = self.db.search_orders(query).await?;
        let count = stale.len();
        for order in stale {
            warn!("🔄️💸️ Order [{}] has been paid since {} but no payout has started. Retrying.", order.id, order.updated_at);
            self.producers.publish_order_paid(OrderPaidEvent::new(order)).await;
        }
        Ok(count)
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Reconciles an inbound `account_credited` deposit of `token_amount` with the pending order waiting for exactly
    /// that amount.
    ///
    /// Deliveries are idempotent per transaction hash. Duplicates and unmatched deposits are not errors; they are
    /// logged and reported in the [`DepositOutcome`]. A match emits an [`OrderPaidEvent`] and returns straight away.
    pub async fn handle_deposit(&self, token_amount: MicroUsdc, tx_hash: &str) -> Result<DepositOutcome, OrderFlowError> {
        if !token_amount.is_positive() {
            warn!("🔄️💰️ Ignoring deposit of {token_amount} (tx {tx_hash}). Amount must be positive.");
            return Ok(DepositOutcome::NoMatch);
        }
        trace!("🔄️💰️ Processing deposit of {token_amount} USDC (tx {tx_hash})");
        match self.db.claim_deposit(token_amount, tx_hash).await? {
            ClaimDepositResult::Matched(order) => {
                info!("🔄️💰️ Deposit {tx_hash} of {token_amount} USDC paid for order [{}]", order.id);
                self.producers.publish_order_paid(OrderPaidEvent::new(order.clone())).await;
                Ok(DepositOutcome::Matched(order))
            },
            ClaimDepositResult::AlreadyProcessed => {
                info!("🔄️💰️ Deposit {tx_hash} has already been processed. Ignoring duplicate delivery.");
                Ok(DepositOutcome::Duplicate)
            },
            ClaimDepositResult::NoMatch => {
                warn!("🔄️💰️ No matching order for deposit of {token_amount} USDC (tx {tx_hash})");
                Ok(DepositOutcome::NoMatch)
            },
        }
    }
}
