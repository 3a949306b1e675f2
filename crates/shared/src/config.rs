//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Default spend limits for new wallets.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Money-movement processing settings.
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Default wallet spend limits, in minor units.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    /// Daily spend limit for new wallets.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: i64,
    /// Monthly spend limit for new wallets.
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: i64,
}

fn default_daily_limit() -> i64 {
    1_000_000 // ₹10,000
}

fn default_monthly_limit() -> i64 {
    10_000_000 // ₹1,00,000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            monthly_limit: default_monthly_limit(),
        }
    }
}

/// Processing configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProcessingConfig {
    /// Deadline for a single money-movement operation, in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl ProcessingConfig {
    /// The operation deadline as a `Duration`.
    #[must_use]
    pub const fn operation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tijori=debug,sea_orm=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TIJORI").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
