//! Value types shared by the USDC payment gateway crates.
mod microusdc;

pub mod decimal;
pub mod helpers;
pub mod op;
mod secret;

pub use microusdc::{MicroUsdc, MicroUsdcConversionError, MICRO_PER_CENT, MICRO_PER_UNIT, USDC_CURRENCY_CODE};
pub use secret::Secret;
