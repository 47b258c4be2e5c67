//! Handler for the `run` command.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::adapter::manifold::Client;
use crate::app::{Config, Orchestrator, RelationshipStore, RunSettings};
use crate::cli::RunArgs;
use crate::error::{ConfigError, Result};
use crate::exchange::Exchange;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, args)?;
    config.init_logging();

    let store = RelationshipStore::new(config.agent.relations_path());
    let book = store.load()?;
    config.check_relationships(&book)?;

    let api_key = config.require_api_key()?;
    let client = Client::new(&config.exchange, &config.rate_limit, Some(api_key))?;
    let me = client.me().await?;
    info!(user = %me.username, balance = me.balance, "Authenticated");

    if config.dry_run {
        info!("Dry-run mode enabled - trades are validated and logged, not placed");
    } else {
        warn!("Live mode - bets will be placed");
    }

    let orchestrator = Orchestrator::new(
        &client,
        me.id,
        store,
        RunSettings::from_config(&config),
    );
    orchestrator.run(args.once).await?;

    info!("dutchbook stopped");
    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
#[allow(clippy::result_large_err)]
fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    if args.live {
        config.dry_run = false;
    }
    if let Some(max_cost) = args.max_cost {
        if max_cost < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "max_cost",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        config.agent.max_cost = max_cost;
    }
    if let Some(iterations) = args.iterations {
        if iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "iterations_per_relationship",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        config.agent.iterations_per_relationship = iterations;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::Error;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("config.toml"),
            live: false,
            once: false,
            max_cost: None,
            iterations: None,
            log_level: None,
            json_logs: false,
        }
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = RunArgs {
            live: true,
            max_cost: Some(dec!(25)),
            iterations: Some(4),
            log_level: Some("debug".into()),
            json_logs: true,
            ..args()
        };

        apply_overrides(&mut config, &args).unwrap();

        assert!(!config.dry_run);
        assert_eq!(config.agent.max_cost, dec!(25));
        assert_eq!(config.agent.iterations_per_relationship, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn no_overrides_keep_dry_run() {
        let mut config = Config::default();
        apply_overrides(&mut config, &args()).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.agent.max_cost, Decimal::ZERO);
    }

    #[test]
    fn rejects_invalid_overrides() {
        let mut config = Config::default();
        let negative = RunArgs {
            max_cost: Some(dec!(-1)),
            ..args()
        };
        assert!(matches!(
            apply_overrides(&mut config, &negative),
            Err(Error::Config(ConfigError::InvalidValue { field: "max_cost", .. }))
        ));

        let zero = RunArgs {
            iterations: Some(0),
            ..args()
        };
        assert!(apply_overrides(&mut config, &zero).is_err());
    }
}
