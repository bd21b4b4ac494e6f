//! A small REST client for the Mural Pay payout API.
//!
//! Only the calls the payment gateway needs are covered: staging a payout request, executing it, and reading it
//! back.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::MuralApi;
pub use config::MuralConfig;
pub use data_objects::{
    ExecutePayoutBody,
    ExchangeRateToleranceMode,
    FiatPayoutDetails,
    PayoutAmount,
    PayoutBody,
    PayoutRequest,
    PayoutRequestBody,
    PhysicalAddress,
    RecipientInfo,
    EXECUTED_STATUS,
    FAILED_STATUS,
};
pub use error::MuralApiError;
