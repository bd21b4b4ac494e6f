use thiserror::Error;

use crate::traits::PaymentGatewayError;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl From<SqliteDatabaseError> for PaymentGatewayError {
    fn from(e: SqliteDatabaseError) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}

/// Returns true if the error is a violation of a UNIQUE constraint or index.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
