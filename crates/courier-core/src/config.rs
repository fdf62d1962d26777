use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// One simulated day, in seconds.
pub const DEFAULT_DAILY_PERIOD_SECS: u64 = 86_400;
/// One simulated week, in seconds.
pub const DEFAULT_WEEKLY_PERIOD_SECS: u64 = 604_800;
/// Simulated transport latency applied by the channel adapters.
pub const DEFAULT_TRANSPORT_DELAY_MS: u64 = 150;

/// Top-level config (courier.toml + COURIER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourierConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Tick periods for the recurring cadences. Shortened in development so a
/// "day" can pass in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_daily_secs")]
    pub daily_period_secs: u64,
    #[serde(default = "default_weekly_secs")]
    pub weekly_period_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            daily_period_secs: DEFAULT_DAILY_PERIOD_SECS,
            weekly_period_secs: DEFAULT_WEEKLY_PERIOD_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default = "default_transport_delay_ms")]
    pub transport_delay_ms: u64,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            transport_delay_ms: DEFAULT_TRANSPORT_DELAY_MS,
        }
    }
}

impl CourierConfig {
    /// Load configuration with precedence:
    ///   1. explicit path argument
    ///   2. COURIER_CONFIG env var
    ///   3. ~/.courier/courier.toml
    /// COURIER_* env vars override file values in all cases.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CourierConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("COURIER_").split("_"))
            .extract()
            .map_err(|e| crate::error::CourierError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.courier/courier.toml", home)
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.courier/courier.db", home)
}

fn default_daily_secs() -> u64 {
    DEFAULT_DAILY_PERIOD_SECS
}

fn default_weekly_secs() -> u64 {
    DEFAULT_WEEKLY_PERIOD_SECS
}

fn default_transport_delay_ms() -> u64 {
    DEFAULT_TRANSPORT_DELAY_MS
}
