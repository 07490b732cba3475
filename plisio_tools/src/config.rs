use std::time::Duration;

use bg_common::Secret;
use log::*;

pub const DEFAULT_API_URL: &str = "https://api.plisio.net/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct PlisioConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Key used to verify the `verify_hash` field on payment notifications.
    pub hmac_secret: Secret<String>,
    /// Where Plisio posts payment notifications, forwarded on every invoice we create.
    pub callback_url: String,
    pub timeout: Duration,
}

impl Default for PlisioConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: Secret::default(),
            hmac_secret: Secret::default(),
            callback_url: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PlisioConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("PLISIO_API_URL").unwrap_or_else(|_| {
            info!("PLISIO_API_URL not set, using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("PLISIO_API_KEY").unwrap_or_else(|_| {
            warn!("PLISIO_API_KEY not set, using (probably useless) default");
            "plisio_00000000000000".to_string()
        }));
        let hmac_secret = Secret::new(std::env::var("PLISIO_HMAC_SECRET").unwrap_or_else(|_| {
            warn!("PLISIO_HMAC_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let callback_url = std::env::var("PLISIO_CALLBACK_URL").unwrap_or_else(|_| {
            warn!("PLISIO_CALLBACK_URL not set. Plisio will not be able to notify us of payments.");
            String::new()
        });
        let timeout = std::env::var("PLISIO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { api_url, api_key, hmac_secret, callback_url, timeout }
    }
}
