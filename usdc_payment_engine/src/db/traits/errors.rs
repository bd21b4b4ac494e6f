use thiserror::Error;

use crate::db_types::{OrderId, OrderStatusType, WithdrawalStatus};

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} already has a withdrawal")]
    WithdrawalAlreadyExists(OrderId),
    #[error("Cannot move order from {from} to {to}")]
    IllegalStatusChange { from: OrderStatusType, to: OrderStatusType },
    #[error("Cannot move withdrawal from {from} to {to}")]
    IllegalWithdrawalStatusChange { from: WithdrawalStatus, to: WithdrawalStatus },
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
