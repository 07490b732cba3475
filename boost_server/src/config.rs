use std::env;

use bg_common::helpers::parse_boolean_flag;
use chrono::Duration;
use log::*;
use plisio_tools::PlisioConfig;

const DEFAULT_BG_HOST: &str = "127.0.0.1";
const DEFAULT_BG_PORT: u16 = 8360;
const DEFAULT_TOP_UP_EXPIRY: Duration = Duration::hours(24);
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Plisio gateway configuration (API key, callback URL, notification HMAC secret).
    pub plisio: PlisioConfig,
    /// How long a top-up may sit in `Pending` before the sweep marks it `Expired`.
    pub top_up_expiry: Duration,
    /// How often the background sweep runs.
    pub sweep_interval_secs: u64,
    /// Whether to run the background sweep at all. Disable when several server instances share
    /// one database and another instance already runs it.
    pub enable_sweep: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BG_HOST.to_string(),
            port: DEFAULT_BG_PORT,
            database_url: String::default(),
            plisio: PlisioConfig::default(),
            top_up_expiry: DEFAULT_TOP_UP_EXPIRY,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            enable_sweep: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BG_HOST").ok().unwrap_or_else(|| DEFAULT_BG_HOST.into());
        let port = env::var("BG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for BG_PORT. {e} Using the default, {DEFAULT_BG_PORT}, instead.");
                    DEFAULT_BG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BG_PORT);
        let database_url = env::var("BG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ BG_DATABASE_URL is not set. Please set it to the URL for the Boostgate database.");
            String::default()
        });
        let plisio = PlisioConfig::new_from_env_or_default();
        let top_up_expiry = env::var("BG_TOP_UP_EXPIRY_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ BG_TOP_UP_EXPIRY_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_TOP_UP_EXPIRY.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for BG_TOP_UP_EXPIRY_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOP_UP_EXPIRY);
        let sweep_interval_secs = env::var("BG_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        let enable_sweep = parse_boolean_flag(env::var("BG_ENABLE_SWEEP").ok(), true);
        Self { host, port, database_url, plisio, top_up_expiry, sweep_interval_secs, enable_sweep }
    }
}
