//! Canonical test configurations.
//!
//! Single source of truth for config documents used across tests.

use std::path::Path;

use rust_decimal::Decimal;

use crate::app::{Config, RunSettings};
use crate::exchange::BucketConfig;

/// A write bucket that never makes a test wait.
pub const fn fast_bucket() -> BucketConfig {
    BucketConfig {
        capacity: 1_000,
        drain_rate: 1_000.0,
    }
}

/// A complete TOML document pointing at `relations`.
pub fn toml(relations: &Path) -> String {
    format!(
        r#"dry_run = true

[exchange]
api_url = "http://127.0.0.1:9/v0"

[rate_limit.write]
capacity = 4
drain_rate = 1.0

[agent]
relations_path = "{}"
cycle_interval_secs = 1
iterations_per_relationship = 2
max_cost = 50

[logging]
level = "warn"
"#,
        relations.display().to_string().replace('\\', "/")
    )
}

/// Parsed form of [`toml`].
pub fn config(relations: &Path) -> Config {
    Config::parse_toml(&toml(relations)).expect("canonical test config is valid")
}

/// Run settings for driving an orchestrator directly.
pub fn settings(dry_run: bool, max_cost: Decimal) -> RunSettings {
    let mut config = Config::default();
    config.dry_run = dry_run;
    config.agent.max_cost = max_cost;
    config.rate_limit.write = fast_bucket();
    RunSettings::from_config(&config)
}
