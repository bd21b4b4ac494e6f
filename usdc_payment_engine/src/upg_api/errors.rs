use thiserror::Error;

use crate::{
    db_types::{MicroUsdc, OrderId},
    payout_provider::PayoutProviderError,
    traits::PaymentGatewayError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid order: {0}")]
    ValidationError(String),
    #[error("Could not allocate a unique payment amount after {0} attempts. Please try again.")]
    AllocationExhausted(usize),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Database error: {0}")]
    DatabaseError(#[from] PaymentGatewayError),
}

impl OrderFlowError {
    /// True if the caller may simply resubmit the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllocationExhausted(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum PayoutError {
    #[error("Order {0} is no longer paid. It has already been picked up for conversion")]
    TransitionNotApplied(OrderId),
    #[error("The payout amount {0} is not positive")]
    InvalidPayoutAmount(MicroUsdc),
    #[error("Payout provider error: {0}")]
    ProviderError(#[from] PayoutProviderError),
    #[error("Database error: {0}")]
    DatabaseError(#[from] PaymentGatewayError),
}
