//! The interface between the payout orchestrator and a concrete fiat payout provider.
//!
//! Providers stage a payout in two phases: a payout *request* is created first, and then executed. Only an executed
//! request moves money.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{MicroUsdc, WithdrawalStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutProviderError {
    #[error("The payout provider could not be reached: {0}")]
    Unavailable(String),
    #[error("The payout provider took too long to respond")]
    Timeout,
    #[error("The payout provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("The payout provider response could not be understood: {0}")]
    InvalidResponse(String),
}

impl PayoutProviderError {
    /// Timeouts, connection failures, rate limiting and server errors may succeed if tried again later. Everything
    /// else will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// The status of a payout request as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutRequestStatus {
    Executed,
    Failed,
    /// Any other provider status (awaiting execution, pending, cancelled etc.). The raw status is kept for display.
    Other(String),
}

impl PayoutRequestStatus {
    /// Parses the provider's upper-case status string.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "EXECUTED" => Self::Executed,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The withdrawal status an `executing` withdrawal should move to, or `None` if it should stay as it is.
    pub fn settled_withdrawal_status(&self) -> Option<WithdrawalStatus> {
        match self {
            Self::Executed => Some(WithdrawalStatus::Completed),
            Self::Failed => Some(WithdrawalStatus::Failed),
            Self::Other(_) => None,
        }
    }
}

impl Display for PayoutRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executed => write!(f, "EXECUTED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequestInfo {
    pub id: String,
    pub status: PayoutRequestStatus,
    /// The provider's per-payout details, passed through untouched.
    pub payouts: Vec<Value>,
}

/// Where the merchant's fiat ends up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecipient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub physical_address: PhysicalAddress,
    pub bank_name: String,
    pub bank_account_owner: String,
    /// Rail specific bank details (account type, number, document id etc.). Forwarded to the provider as is.
    pub fiat_and_rail_details: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalAddress {
    pub address1: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

/// A fiat payout provider.
///
/// Implementations must bound every call with a timeout and classify failures with [`PayoutProviderError`].
#[allow(async_fn_in_trait)]
pub trait PayoutProvider {
    /// Stages a payout of `amount` from the `source_account_id` to `recipient`. Returns the provider's request id.
    async fn create_payout_request(
        &self,
        source_account_id: &str,
        amount: MicroUsdc,
        recipient: &PayoutRecipient,
    ) -> Result<String, PayoutProviderError>;

    /// Executes a previously staged payout request.
    async fn execute_payout_request(&self, request_id: &str) -> Result<PayoutRequestStatus, PayoutProviderError>;

    async fn get_payout_request(&self, request_id: &str) -> Result<PayoutRequestInfo, PayoutProviderError>;
}
