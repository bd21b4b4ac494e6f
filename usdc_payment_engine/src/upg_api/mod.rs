//! # USDC payment engine public API
//!
//! The `upg_api` module exposes the programmatic API for the payment engine. The API is modular, so that clients can
//! pick the parts they need.
//!
//! * [`order_flow_api`] handles checkouts and the reconciliation of inbound deposits with pending orders.
//! * [`payout_api`] converts paid orders into fiat payouts through a [`crate::PayoutProvider`].
//! * [`catalog_api`] lists the products on sale, and can seed a demo catalog.
//! * [`merchant_api`] provides the merchant's views of orders and withdrawals.
//! * [`fingerprint`] allocates the unique deposit amounts that identify pending orders.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits required by the
//! API.
//!
//! ```rust,ignore
//! use usdc_payment_engine::{events::EventProducers, DepositConfig, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = OrderFlowApi::new(db, DepositConfig::new("0xabc..."), EventProducers::default());
//! let checkout = api.create_order("jane@example.com", &items).await?;
//! ```
pub mod catalog_api;
pub mod errors;
pub mod fingerprint;
pub mod merchant_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod payout_api;
