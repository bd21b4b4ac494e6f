use crate::{
    db_types::{MicroUsdc, NewOrder, Order, OrderId, OrderStatusType},
    traits::{ClaimDepositResult, InsertOrderResult, PaymentGatewayError},
};

/// This trait defines the highest level of behaviour for backends supporting the USDC Payment Engine.
///
/// This behaviour includes:
/// * Storing new orders under the active-fingerprint uniqueness constraint
/// * Matching inbound deposits to pending orders, exactly once
/// * Moving orders through their lifecycle with compare-and-set updates
///
/// None of these methods are allowed to read a value and then write based on it in separate statements. The backend
/// constraints are the authority on uniqueness.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores the order and its items in a single atomic transaction, in status `pending_payment`.
    ///
    /// If another pending order already holds `order.fingerprint_amount`, nothing is written and
    /// [`InsertOrderResult::FingerprintTaken`] is returned.
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, PaymentGatewayError>;

    /// Claims the pending order with fingerprint `amount` for the deposit `tx_hash`.
    ///
    /// The match and the `pending_payment -> paid` transition happen in one statement, so two concurrent deliveries
    /// can never both succeed. A non-empty `tx_hash` is recorded on the order and may only ever pay one order. An
    /// empty hash is stored as NULL and is not deduplicated.
    async fn claim_deposit(&self, amount: MicroUsdc, tx_hash: &str) -> Result<ClaimDepositResult, PaymentGatewayError>;

    /// Moves the order from `from` to `to`, but only if it is currently in status `from`.
    ///
    /// Returns the updated order, or `None` if the transition was not applied because the order is in some other
    /// state (or does not exist). Illegal lifecycle edges are rejected with an error before touching the database.
    async fn transition_order(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}
