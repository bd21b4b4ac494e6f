//! `SqliteDatabase` is a concrete implementation of a USDC Payment Engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{db_url, is_unique_violation, new_pool, orders, products, run_migrations, withdrawals, SqliteDatabaseError};
use crate::{
    db_types::{
        MicroUsdc,
        NewOrder,
        NewProduct,
        NewWithdrawal,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        Product,
        ProductId,
        Withdrawal,
        WithdrawalStatus,
    },
    traits::{
        CatalogManagement,
        ClaimDepositResult,
        InsertOrderResult,
        OrderManagement,
        OrderQueryFilter,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        WithdrawalManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::insert_order(order, &mut tx).await?;
        // Dropping the transaction rolls it back, which is what we want if the fingerprint was taken
        if matches!(result, InsertOrderResult::Inserted(_)) {
            tx.commit().await?;
        }
        Ok(result)
    }

    async fn claim_deposit(&self, amount: MicroUsdc, tx_hash: &str) -> Result<ClaimDepositResult, PaymentGatewayError> {
        let tx_hash = Some(tx_hash.trim()).filter(|h| !h.is_empty());
        let mut conn = self.pool.acquire().await?;
        if let Some(hash) = tx_hash {
            if orders::is_tx_hash_processed(hash, &mut conn).await? {
                debug!("🗃️ Transaction {hash} has already been processed");
                return Ok(ClaimDepositResult::AlreadyProcessed);
            }
        }
        match orders::claim_pending_order(amount, tx_hash, &mut conn).await {
            Ok(Some(order)) => {
                debug!("🗃️ Order [{}] claimed by deposit of {amount}", order.id);
                Ok(ClaimDepositResult::Matched(order))
            },
            Ok(None) => {
                // A concurrent delivery of the same transaction may have got there first
                if let Some(hash) = tx_hash {
                    if orders::is_tx_hash_processed(hash, &mut conn).await? {
                        return Ok(ClaimDepositResult::AlreadyProcessed);
                    }
                }
                Ok(ClaimDepositResult::NoMatch)
            },
            // Lost a race with a concurrent delivery of the same transaction
            Err(e) if is_unique_violation(&e) => {
                debug!("🗃️ Transaction {tx_hash:?} was processed concurrently");
                Ok(ClaimDepositResult::AlreadyProcessed)
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn transition_order(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        if !from.can_transition_to(to) {
            return Err(PaymentGatewayError::IllegalStatusChange { from, to });
        }
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, from, to, &mut conn).await?;
        match &order {
            Some(_) => debug!("🗃️ Order [{order_id}] moved from {from} to {to}"),
            None => debug!("🗃️ Order [{order_id}] is not {from}. Transition to {to} was not applied"),
        }
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_pending_order_by_fingerprint(&self, amount: MicroUsdc) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_pending_order_by_fingerprint(amount, &mut conn).await?;
        Ok(order)
    }

    async fn is_tx_hash_processed(&self, tx_hash: &str) -> Result<bool, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let processed = orders::is_tx_hash_processed(tx_hash, &mut conn).await?;
        Ok(processed)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_products(&self) -> Result<Vec<Product>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products_by_ids(ids, &mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, PaymentGatewayError> {
        if !product.price.is_positive() {
            return Err(PaymentGatewayError::InvalidProduct(format!("{} must have a positive price", product.name)));
        }
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        debug!("🗃️ Product [{}] '{}' added to the catalog at {}", product.id, product.name, product.price);
        Ok(product)
    }
}

impl WithdrawalManagement for SqliteDatabase {
    async fn insert_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, PaymentGatewayError> {
        let order_id = withdrawal.order_id.clone();
        let mut conn = self.pool.acquire().await?;
        match withdrawals::insert_withdrawal(withdrawal, &mut conn).await {
            Ok(w) => {
                debug!("🗃️ Withdrawal #{} recorded for order [{order_id}]", w.id);
                Ok(w)
            },
            Err(e) if is_unique_violation(&e) => Err(PaymentGatewayError::WithdrawalAlreadyExists(order_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_withdrawals(&self) -> Result<Vec<Withdrawal>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawals = withdrawals::fetch_withdrawals(&mut conn).await?;
        Ok(withdrawals)
    }

    async fn fetch_withdrawal_for_order(&self, order_id: &OrderId) -> Result<Option<Withdrawal>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let withdrawal = withdrawals::fetch_withdrawal_for_order(order_id, &mut conn).await?;
        Ok(withdrawal)
    }

    async fn transition_withdrawal(
        &self,
        id: i64,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    ) -> Result<Option<Withdrawal>, PaymentGatewayError> {
        if !from.can_transition_to(to) {
            return Err(PaymentGatewayError::IllegalWithdrawalStatusChange { from, to });
        }
        let mut conn = self.pool.acquire().await?;
        let withdrawal = withdrawals::update_withdrawal_status(id, from, to, &mut conn).await?;
        if withdrawal.is_some() {
            debug!("🗃️ Withdrawal #{id} moved from {from} to {to}");
        }
        Ok(withdrawal)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `UPG_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        run_migrations(&self.pool).await
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
