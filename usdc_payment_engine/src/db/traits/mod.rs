//! #  Database management and control.
//!
//! This module provides the interfaces that define the contracts of the payment engine database *backends*.
//!
//! * [`PaymentGatewayDatabase`] defines the highest level of behaviour: inserting orders under the fingerprint
//!   uniqueness constraint, claiming orders with deposits, and compare-and-set status transitions.
//! * [`OrderManagement`] defines the behaviour for querying information about orders.
//! * [`CatalogManagement`] provides access to the product catalog.
//! * [`WithdrawalManagement`] records and advances the fiat payouts made for paid orders.
//!
//! Every method returns a [`PaymentGatewayError`], so that callers (and mocks) do not need to care which backend is
//! in use.
mod catalog_management;
mod data_objects;
mod errors;
mod order_management;
mod payment_gateway_database;
mod withdrawal_management;

pub use catalog_management::CatalogManagement;
pub use data_objects::{ClaimDepositResult, InsertOrderResult, OrderQueryFilter};
pub use errors::PaymentGatewayError;
pub use order_management::OrderManagement;
pub use payment_gateway_database::PaymentGatewayDatabase;
pub use withdrawal_management::WithdrawalManagement;
