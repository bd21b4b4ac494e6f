//! USDC Payment Engine
//!
//! The USDC Payment Engine lets merchants sell goods for stablecoin deposits to a single shared deposit address, and
//! automatically converts each confirmed deposit into a fiat payout. This library contains the core logic for the
//! gateway. It is provider-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use the public API provided by the payment engine. The exception is the data
//!    types used in the database. These are defined in the [`db_types`] module and are public.
//! 2. The payment engine public API ([`mod@upg_api`]). This provides checkout, deposit reconciliation, payout
//!    orchestration and the merchant views.
//! 3. The [`PayoutProvider`] trait, which a concrete payout provider (e.g. Mural Pay) implements so that the engine can
//!    stage and execute fiat payouts.
//!
//! Deposits are matched to orders by amount. Every pending order is given a unique *fingerprint amount*: its total
//! plus a few micro-units. See [`FingerprintAllocator`] for details.
//!
//! When an order is paid, an [`events::OrderPaidEvent`] is emitted. The payout conversion runs off the back of that
//! event, so that the caller reporting the deposit never waits on the payout provider.
mod db;

pub mod db_types;
pub mod events;
pub mod payout_provider;
mod upg_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{run_migrations, SqliteDatabase, SqliteDatabaseError};
pub use db::traits;
pub use db::traits::{
    CatalogManagement,
    ClaimDepositResult,
    InsertOrderResult,
    OrderManagement,
    OrderQueryFilter,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    WithdrawalManagement,
};
pub use payout_provider::{
    PayoutProvider,
    PayoutProviderError,
    PayoutRecipient,
    PayoutRequestInfo,
    PayoutRequestStatus,
    PhysicalAddress,
};
pub use upg_api::{
    catalog_api::CatalogApi,
    errors::{OrderFlowError, PayoutError},
    fingerprint::{FingerprintAllocator, OffsetSource, MAX_ALLOCATION_ATTEMPTS},
    merchant_api::MerchantApi,
    order_flow_api::{DepositConfig, OrderFlowApi, DEFAULT_DEPOSIT_NETWORK},
    order_objects,
    payout_api::{PayoutApi, PayoutConfig},
};
