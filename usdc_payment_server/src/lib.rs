//! # USDC payment gateway server
//! This crate hosts the HTTP server for the gateway. It is responsible for:
//! * Serving the product catalog and taking checkouts, which hand out a unique deposit amount for every order.
//! * Listening for Mural Pay webhooks. Credited deposits are matched to pending orders by amount.
//! * Converting paid orders into COP bank payouts through the Mural Pay payout API, off the request path.
//! * Giving the merchant a view of orders and withdrawals.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/products`: The product catalog.
//! * `/orders`, `/orders/{id}`: Checkout and order status.
//! * `/webhooks/mural`: Deposit notifications from Mural Pay.
//! * `/merchant/orders`, `/merchant/orders/{id}`, `/merchant/withdrawals`: The merchant dashboard.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod payout_worker;
pub mod routes;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod endpoint_tests;
