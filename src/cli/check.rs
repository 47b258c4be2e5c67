//! Configuration validation command.

use std::path::Path;

use crate::app::{Config, RelationshipStore, API_KEY_ENV};
use crate::cli::output;
use crate::error::Result;

/// Validate the configuration file and the relationship document it points
/// at, without contacting the exchange.
#[allow(clippy::result_large_err)]
pub fn execute_config(path: &Path) -> Result<()> {
    output::header();
    output::section(&format!("Checking {}", path.display()));

    let config = Config::load(path)?;
    output::success("Configuration file is valid");
    output::field("API", &config.exchange.api_url);
    output::field("Mode", if config.dry_run { "dry run" } else { "live" });
    output::field("Max cost", config.agent.max_cost);
    output::field(
        "Read bucket",
        format!(
            "{} @ {}/s",
            config.rate_limit.read.capacity, config.rate_limit.read.drain_rate
        ),
    );
    output::field(
        "Write bucket",
        format!(
            "{} @ {}/s",
            config.rate_limit.write.capacity, config.rate_limit.write.drain_rate
        ),
    );

    if config.api_key.is_some() {
        output::success(&format!("API key found ({API_KEY_ENV})"));
    } else {
        output::warning(&format!("{API_KEY_ENV} is not set; `dutchbook run` will fail"));
    }

    output::section("Relationships");
    let store = RelationshipStore::new(config.agent.relations_path());
    output::field("Document", store.path().display());
    if !store.path().exists() {
        output::warning("No relationship document yet");
        output::note("Declare one with `dutchbook relations add`");
        return Ok(());
    }

    let book = store.load()?;
    config.check_relationships(&book)?;
    output::success(&format!("{} relationships are valid", book.len()));
    output::field("Equivalences", book.equivalences.len());
    output::field("Orderings", book.orderings.len());
    output::field("General", book.arb_opportunities.len());

    Ok(())
}
