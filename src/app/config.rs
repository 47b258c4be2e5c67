//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. The exchange API key comes from
//! the `MANIFOLD_API_KEY` environment variable, never from the file.
//!
//! # Example
//!
//! ```no_run
//! use dutchbook::app::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::logging::LoggingConfig;
use super::paths;
use crate::domain::relation::{RelationshipBook, DEFAULT_MAX_SHARES};
use crate::domain::strategy::SearchLimits;
use crate::error::{ConfigError, Result};
use crate::exchange::BucketConfig;

/// Environment variable holding the exchange API key.
pub const API_KEY_ENV: &str = "MANIFOLD_API_KEY";

/// Exchange connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_api_url() -> String {
    "https://api.manifold.markets/v0".into()
}

const fn default_connect_timeout_ms() -> u64 {
    3_050
}

const fn default_request_timeout_ms() -> u64 {
    20_000
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Independent buckets for read and write traffic.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_read_bucket")]
    pub read: BucketConfig,
    #[serde(default = "default_write_bucket")]
    pub write: BucketConfig,
}

const fn default_read_bucket() -> BucketConfig {
    BucketConfig {
        capacity: 100,
        drain_rate: 8.0,
    }
}

const fn default_write_bucket() -> BucketConfig {
    BucketConfig {
        capacity: 10,
        drain_rate: 0.5,
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            read: default_read_bucket(),
            write: default_write_bucket(),
        }
    }
}

/// Trading loop settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Relationship document. Defaults to `~/.dutchbook/relations.json`.
    #[serde(default)]
    pub relations_path: Option<PathBuf>,
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// Plans executed per relationship per cycle.
    #[serde(default = "default_iterations")]
    pub iterations_per_relationship: usize,
    /// Net cost a single plan may spend. Unrelated to relationship margins.
    #[serde(default)]
    pub max_cost: Decimal,
    /// Share cap for plans that open new exposure.
    #[serde(default = "default_max_open_shares")]
    pub max_open_shares: f64,
}

const fn default_cycle_interval_secs() -> u64 {
    5
}

const fn default_iterations() -> usize {
    1
}

const fn default_max_open_shares() -> f64 {
    DEFAULT_MAX_SHARES
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            relations_path: None,
            cycle_interval_secs: default_cycle_interval_secs(),
            iterations_per_relationship: default_iterations(),
            max_cost: Decimal::ZERO,
            max_open_shares: default_max_open_shares(),
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn relations_path(&self) -> PathBuf {
        self.relations_path
            .clone()
            .unwrap_or_else(paths::default_relations)
    }

    #[must_use]
    pub const fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    #[must_use]
    pub const fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_open_shares: self.max_open_shares,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Compute and log trades without placing them. Defaults to true.
    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default)]
    pub exchange: ExchangeConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Loaded from `MANIFOLD_API_KEY` at runtime.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: true,
            exchange: ExchangeConfig::default(),
            rate_limit: RateLimitConfig::default(),
            agent: AgentConfig::default(),
            logging: LoggingConfig::default(),
            api_key: None,
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never from the config file.
        config.api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.exchange.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if let Err(e) = url::Url::parse(&self.exchange.api_url) {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                reason: e.to_string(),
            }
            .into());
        }
        if self.exchange.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms", "must be greater than 0"));
        }
        if self.exchange.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be greater than 0"));
        }

        for (field, bucket) in [
            ("rate_limit.read", self.rate_limit.read),
            ("rate_limit.write", self.rate_limit.write),
        ] {
            if bucket.capacity == 0 {
                return Err(invalid(field, "capacity must be at least 1"));
            }
            if !(bucket.drain_rate.is_finite() && bucket.drain_rate > 0.0) {
                return Err(invalid(field, "drain_rate must be greater than 0"));
            }
        }

        if self.agent.iterations_per_relationship == 0 {
            return Err(invalid("iterations_per_relationship", "must be at least 1"));
        }
        if self.agent.max_cost < Decimal::ZERO {
            return Err(invalid("max_cost", "must be 0 or greater"));
        }
        if !(self.agent.max_open_shares.is_finite() && self.agent.max_open_shares > 0.0) {
            return Err(invalid("max_open_shares", "must be greater than 0"));
        }

        if !LoggingConfig::FORMATS.contains(&self.logging.format.as_str()) {
            return Err(invalid("logging.format", "must be \"pretty\" or \"json\""));
        }
        Ok(())
    }

    /// Check every relationship in `book` against this configuration.
    ///
    /// A plan is leased from the write bucket in one batch, so a
    /// relationship with more legs than the bucket holds could never run.
    #[allow(clippy::result_large_err)]
    pub fn check_relationships(&self, book: &RelationshipBook) -> Result<()> {
        book.validate(self.rate_limit.write.capacity)
            .map_err(|(index, source)| ConfigError::Relationship { index, source }.into())
    }

    /// The API key, or an error when it is required but unset.
    #[allow(clippy::result_large_err)]
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| crate::error::ExchangeError::MissingApiKey.into())
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
