use sqlx::SqliteConnection;

use super::single_row;
use crate::db_types::{NewWithdrawal, OrderId, Withdrawal, WithdrawalStatus};

pub async fn insert_withdrawal(withdrawal: NewWithdrawal, conn: &mut SqliteConnection) -> Result<Withdrawal, sqlx::Error> {
    let rows = sqlx::query_as::<_, Withdrawal>(
        r#"
            INSERT INTO withdrawals (order_id, provider_payout_request_id, amount, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(withdrawal.order_id.as_str())
    .bind(withdrawal.provider_payout_request_id)
    .bind(withdrawal.amount)
    .bind(withdrawal.status)
    .fetch_all(conn)
    .await?;
    single_row(rows)
}

pub async fn fetch_withdrawals(conn: &mut SqliteConnection) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as("SELECT * FROM withdrawals ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(withdrawals)
}

pub async fn fetch_withdrawal_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(withdrawals.into_iter().next())
}

pub async fn update_withdrawal_status(
    id: i64,
    from: WithdrawalStatus,
    to: WithdrawalStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>(
        r#"
            UPDATE withdrawals
            SET status = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(id)
    .bind(from)
    .fetch_all(conn)
    .await?;
    Ok(withdrawals.into_iter().next())
}
