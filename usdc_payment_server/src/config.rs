//! Server configuration.
//!
//! Everything is read from `UPG_*` environment variables once, at startup. Missing values fall back to defaults
//! with a log message, so that a half configured server still starts and can serve the catalog. Run the binary with
//! any argument to get a list of the variables.
use std::env;

use chrono::Duration;
use log::*;
use mural_tools::MuralConfig;
use serde::de::DeserializeOwned;
use serde_json::json;
use upg_common::helpers::env_flag;
use usdc_payment_engine::{DepositConfig, PayoutConfig, PayoutRecipient, PhysicalAddress, DEFAULT_DEPOSIT_NETWORK};

const DEFAULT_UPG_HOST: &str = "127.0.0.1";
const DEFAULT_UPG_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/usdc_store.db";
const DEFAULT_PAYOUT_RECOVERY_INTERVAL: Duration = Duration::minutes(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The wallet address that every customer pays into
    pub deposit_address: String,
    pub deposit_network: String,
    /// The Mural account that receives deposits and funds the payouts
    pub mural_account_id: String,
    /// PEM encoded P-256 public key for webhook signatures. `None` disables verification.
    pub webhook_public_key: Option<String>,
    /// Seed the demo catalog if the products table is empty
    pub seed_catalog: bool,
    /// How often to look for paid orders that were never converted, and how long an order must have sat in `paid`
    /// before it is picked up.
    pub payout_recovery_interval: Duration,
    pub mural: MuralConfig,
    pub recipient: PayoutRecipient,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UPG_HOST.to_string(),
            port: DEFAULT_UPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            deposit_address: String::default(),
            deposit_network: DEFAULT_DEPOSIT_NETWORK.to_string(),
            mural_account_id: String::default(),
            webhook_public_key: None,
            seed_catalog: true,
            payout_recovery_interval: DEFAULT_PAYOUT_RECOVERY_INTERVAL,
            mural: MuralConfig::default(),
            recipient: default_recipient(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("UPG_HOST").ok().unwrap_or_else(|| DEFAULT_UPG_HOST.into());
        let port = env::var("UPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for UPG_PORT. {e} Using the default, {DEFAULT_UPG_PORT}, instead."
                    );
                    DEFAULT_UPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_UPG_PORT);
        let database_url = env::var("UPG_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ UPG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let deposit_address = env::var("UPG_DEPOSIT_ADDRESS").ok().unwrap_or_else(|| {
            error!(
                "🪛️ UPG_DEPOSIT_ADDRESS is not set. Customers will not be told where to pay. Set it to the wallet \
                 address of your Mural account."
            );
            String::default()
        });
        let deposit_network = env::var("UPG_DEPOSIT_NETWORK").ok().unwrap_or_else(|| DEFAULT_DEPOSIT_NETWORK.into());
        let mural_account_id = env::var("UPG_MURAL_ACCOUNT_ID").ok().unwrap_or_else(|| {
            error!("🪛️ UPG_MURAL_ACCOUNT_ID is not set. Payouts will fail until it is.");
            String::default()
        });
        let webhook_public_key = env::var("UPG_WEBHOOK_PUBLIC_KEY").ok().filter(|s| !s.trim().is_empty());
        if webhook_public_key.is_none() {
            warn!("🚨️ UPG_WEBHOOK_PUBLIC_KEY is not set. Webhook signatures will NOT be verified.");
        }
        let seed_catalog = env_flag("UPG_SEED_CATALOG", true);
        let payout_recovery_interval = configure_recovery_interval();
        let mural = MuralConfig::new_from_env_or_default();
        let recipient = configure_recipient();
        Self {
            host,
            port,
            database_url,
            deposit_address,
            deposit_network,
            mural_account_id,
            webhook_public_key,
            seed_catalog,
            payout_recovery_interval,
            mural,
            recipient,
        }
    }

    pub fn deposit_config(&self) -> DepositConfig {
        DepositConfig::new(self.deposit_address.as_str()).with_network(self.deposit_network.as_str())
    }

    pub fn payout_config(&self) -> PayoutConfig {
        PayoutConfig { source_account_id: self.mural_account_id.clone(), recipient: self.recipient.clone() }
    }
}

fn configure_recovery_interval() -> Duration {
    env::var("UPG_PAYOUT_RECOVERY_INTERVAL")
        .map_err(|_| {
            info!(
                "🪛️ UPG_PAYOUT_RECOVERY_INTERVAL is not set. Using the default value of {} s.",
                DEFAULT_PAYOUT_RECOVERY_INTERVAL.num_seconds()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for UPG_PAYOUT_RECOVERY_INTERVAL. {e}"))
                .and_then(|secs| {
                    if secs > 0 {
                        Ok(Duration::seconds(secs))
                    } else {
                        warn!("🪛️ UPG_PAYOUT_RECOVERY_INTERVAL must be positive");
                        Err(())
                    }
                })
        })
        .ok()
        .unwrap_or(DEFAULT_PAYOUT_RECOVERY_INTERVAL)
}

fn configure_recipient() -> PayoutRecipient {
    let defaults = default_recipient();
    let text = |name: &str, default: String| {
        env::var(name).ok().unwrap_or_else(|| {
            warn!("🪛️ {name} is not set. Using the sandbox value, '{default}'.");
            default
        })
    };
    PayoutRecipient {
        first_name: text("UPG_PAYOUT_FIRST_NAME", defaults.first_name),
        last_name: text("UPG_PAYOUT_LAST_NAME", defaults.last_name),
        email: text("UPG_PAYOUT_EMAIL", defaults.email),
        physical_address: json_env("UPG_PAYOUT_ADDRESS").unwrap_or(defaults.physical_address),
        bank_name: text("UPG_PAYOUT_BANK_NAME", defaults.bank_name),
        bank_account_owner: text("UPG_PAYOUT_BANK_ACCOUNT_OWNER", defaults.bank_account_owner),
        fiat_and_rail_details: json_env("UPG_PAYOUT_FIAT_DETAILS").unwrap_or(defaults.fiat_and_rail_details),
    }
}

fn json_env<T: DeserializeOwned>(name: &str) -> Option<T> {
    let s = env::var(name).ok()?;
    serde_json::from_str(&s).map_err(|e| error!("🪛️ {name} does not hold valid JSON. {e}. Using the default.")).ok()
}

/// Sandbox bank details for a Colombian merchant account.
fn default_recipient() -> PayoutRecipient {
    PayoutRecipient {
        first_name: "Marketplace".to_string(),
        last_name: "Merchant".to_string(),
        email: "merchant@marketplace.test".to_string(),
        physical_address: PhysicalAddress {
            address1: "Calle 100 #19-61".to_string(),
            city: "Bogota".to_string(),
            state: "CO-DC".to_string(),
            country: "CO".to_string(),
            zip: "110111".to_string(),
        },
        bank_name: "Bancolombia".to_string(),
        bank_account_owner: "Marketplace Merchant".to_string(),
        fiat_and_rail_details: json!({
            "type": "cop",
            "symbol": "COP",
            "phoneNumber": "+573001234567",
            "accountType": "SAVINGS",
            "bankAccountNumber": "123456789012",
            "documentNumber": "1234567890",
            "documentType": "NATIONAL_ID"
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::new("0.0.0.0", 9000);
        assert_eq!(config.port, 9000);
        assert_eq!(config.deposit_network, "Polygon");
        assert_eq!(config.payout_recovery_interval, Duration::minutes(5));
        assert!(config.webhook_public_key.is_none());
        let payout = config.payout_config();
        assert_eq!(payout.recipient.fiat_and_rail_details["symbol"], "COP");
    }

    #[test]
    fn deposit_instructions() {
        let config = ServerConfig { deposit_address: "0xabc".into(), ..Default::default() };
        let deposit = config.deposit_config();
        let amount = "1.500042".parse().unwrap();
        assert_eq!(deposit.instructions(amount), "Send exactly 1.500042 USDC to 0xabc on Polygon");
    }
}
