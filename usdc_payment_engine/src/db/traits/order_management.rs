use crate::{
    db_types::{MicroUsdc, Order, OrderId, OrderItem},
    traits::{OrderQueryFilter, PaymentGatewayError},
};

/// The `OrderManagement` trait defines the behaviour for querying information about orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError>;

    /// Fetches orders matching the filter, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Returns the pending order whose fingerprint amount is exactly `amount`, if there is one.
    async fn fetch_pending_order_by_fingerprint(&self, amount: MicroUsdc) -> Result<Option<Order>, PaymentGatewayError>;

    /// Returns true if any order has already been paid with the given transaction hash.
    async fn is_tx_hash_processed(&self, tx_hash: &str) -> Result<bool, PaymentGatewayError>;
}
