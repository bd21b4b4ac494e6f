use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::{is_unique_violation, single_row},
    db_types::{MicroUsdc, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType},
    traits::{InsertOrderResult, OrderQueryFilter},
};

/// Inserts a new pending order and its items using the given connection. This is not atomic. Embed this call inside
/// a transaction, and pass `&mut *tx` as the connection argument, so that an order is never stored without its items.
///
/// If the fingerprint amount is already held by a pending order, [`InsertOrderResult::FingerprintTaken`] is returned
/// and nothing is written.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<InsertOrderResult, sqlx::Error> {
    let result = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                id,
                customer_email,
                status,
                total_amount,
                fingerprint_amount,
                deposit_address
            ) VALUES ($1, $2, 'pending_payment', $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.id.as_str())
    .bind(&order.customer_email)
    .bind(order.total_amount)
    .bind(order.fingerprint_amount)
    .bind(&order.deposit_address)
    .fetch_all(&mut *conn)
    .await
    .and_then(single_row);
    let inserted = match result {
        Ok(o) => o,
        Err(e) if is_unique_violation(&e) => {
            trace!("🗃️ Fingerprint {} is already held by a pending order", order.fingerprint_amount);
            return Ok(InsertOrderResult::FingerprintTaken);
        },
        Err(e) => return Err(e),
    };
    for item in &order.items {
        insert_order_item(&inserted.id, item, &mut *conn).await?;
    }
    debug!("🗃️ Order [{}] inserted with {} items", inserted.id, order.items.len());
    Ok(InsertOrderResult::Inserted(inserted))
}

async fn insert_order_item(
    order_id: &OrderId,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
        .bind(order_id.as_str())
        .bind(item.product_id.as_str())
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(orders.into_iter().next())
}

pub async fn fetch_order_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_pending_order_by_fingerprint(
    amount: MicroUsdc,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE status = 'pending_payment' AND fingerprint_amount = $1 ORDER BY created_at LIMIT 1",
    )
    .bind(amount)
    .fetch_all(conn)
    .await?;
    Ok(orders.into_iter().next())
}

pub async fn is_tx_hash_processed(tx_hash: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let hits: Vec<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE deposit_tx_hash = $1 LIMIT 1")
        .bind(tx_hash)
        .fetch_all(conn)
        .await?;
    Ok(!hits.is_empty())
}

/// Matches the deposit against the pending order with fingerprint `amount` and marks it as paid, in a single
/// statement. Returns `None` if there is no such order.
///
/// A `tx_hash` that has already paid for another order makes the statement fail with a unique constraint violation.
pub async fn claim_pending_order(
    amount: MicroUsdc,
    tx_hash: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders
            SET status = 'paid',
                deposit_tx_hash = $1,
                updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = (
                SELECT id FROM orders
                WHERE status = 'pending_payment' AND fingerprint_amount = $2
                ORDER BY created_at
                LIMIT 1
            ) AND status = 'pending_payment'
            RETURNING *;
        "#,
    )
    .bind(tx_hash)
    .bind(amount)
    .fetch_all(conn)
    .await?;
    Ok(orders.into_iter().next())
}

/// Compare-and-set status update. Returns `None` if the order is not currently in status `from`.
pub async fn update_order_status(
    order_id: &OrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders
            SET status = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(order_id.as_str())
    .bind(from)
    .fetch_all(conn)
    .await?;
    Ok(orders.into_iter().next())
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(statuses) = query.statuses.filter(|s| !s.is_empty()) {
        let statuses = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if let Some(idle_for) = query.idle_for {
        where_clause.push("updated_at < strftime('%Y-%m-%d %H:%M:%f', 'now', ");
        where_clause.push_bind_unseparated(format!("-{} seconds", idle_for.num_seconds()));
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at DESC, rowid DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {} orders", orders.len());
    Ok(orders)
}
