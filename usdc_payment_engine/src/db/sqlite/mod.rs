//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an atomic transaction as
//! the need arises and call through to the functions without any other changes.
//!
//! [`SqliteDatabase`] ties these together and implements the backend traits.
use std::{env, str::FromStr, time::Duration};

use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

mod db;
mod errors;

pub mod orders;
pub mod products;
pub mod withdrawals;

pub use db::SqliteDatabase;
pub(crate) use errors::is_unique_violation;
pub use errors::SqliteDatabaseError;

const SQLITE_DB_URL: &str = "sqlite://data/usdc_store.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn db_url() -> String {
    let result = env::var("UPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ UPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Creates a connection pool. The database file is created if it does not exist yet.
///
/// Concurrent writers are serialised by SQLite, so every connection waits up to [`BUSY_TIMEOUT`] for the write lock
/// rather than failing immediately.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Takes the one row a `RETURNING` statement produced.
///
/// Statements in this module always run with `fetch_all`. A statement left un-stepped by `fetch_one` or
/// `fetch_optional` pins its pooled connection to a read snapshot older than later commits.
pub(crate) fn single_row<T>(rows: Vec<T>) -> Result<T, sqlx::Error> {
    rows.into_iter().next().ok_or(sqlx::Error::RowNotFound)
}

/// Brings the schema up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteDatabaseError> {
    sqlx::migrate!("./src/db/sqlite/migrations").run(pool).await?;
    info!("🗃️ Database migrations complete");
    Ok(())
}
