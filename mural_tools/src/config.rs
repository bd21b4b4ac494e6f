use std::time::Duration;

use log::*;
use upg_common::Secret;

pub const DEFAULT_MURAL_API_URL: &str = "https://api-staging.muralpay.com";
pub const DEFAULT_MURAL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct MuralConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Sent only on calls that move funds
    pub transfer_api_key: Secret<String>,
    pub timeout: Duration,
}

impl Default for MuralConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_MURAL_API_URL.to_string(),
            api_key: Secret::default(),
            transfer_api_key: Secret::default(),
            timeout: DEFAULT_MURAL_TIMEOUT,
        }
    }
}

impl MuralConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("UPG_MURAL_API_URL").unwrap_or_else(|_| {
            warn!("🪛️ UPG_MURAL_API_URL not set, using {DEFAULT_MURAL_API_URL}");
            DEFAULT_MURAL_API_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("UPG_MURAL_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ UPG_MURAL_API_KEY not set. Payout requests will be rejected.");
            String::default()
        }));
        let transfer_api_key = Secret::new(std::env::var("UPG_MURAL_TRANSFER_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ UPG_MURAL_TRANSFER_API_KEY not set. Payouts cannot be executed.");
            String::default()
        }));
        let timeout = std::env::var("UPG_MURAL_TIMEOUT")
            .ok()
            .and_then(|s| match s.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(e) => {
                    warn!("🪛️ Invalid UPG_MURAL_TIMEOUT ({s}): {e}. Using the default.");
                    None
                },
            })
            .unwrap_or(DEFAULT_MURAL_TIMEOUT);
        Self { api_url: api_url.trim_end_matches('/').to_string(), api_key, transfer_api_key, timeout }
    }
}
