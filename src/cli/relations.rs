//! Relationship listing and interactive entry.

use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Input, Select};
use tabled::{Table, Tabled};

use crate::adapter::manifold::Client;
use crate::app::{Config, RelationshipStore};
use crate::cli::{output, RelationsArgs};
use crate::domain::relation::{EquivalenceRelation, GeneralRelation, OrderingRelation};
use crate::domain::{Direction, Outcome, Relationship, RelationshipBook};
use crate::error::{ConfigError, Result};
use crate::exchange::Exchange;

#[derive(Tabled)]
struct RelationshipRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Directions")]
    directions: String,
    #[tabled(rename = "Bound")]
    bound: String,
}

impl RelationshipRow {
    fn new(index: usize, relationship: &Relationship) -> Self {
        let directions = relationship
            .directions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        let bound = match relationship {
            Relationship::Equivalence(r) => format!("margin {}", r.margin),
            Relationship::Ordering(r) => format!("margin {}", r.margin),
            Relationship::General(r) => {
                format!("sum <= {} (max {} shares)", r.maximum, r.max_shares)
            }
        };
        Self {
            index,
            kind: relationship.kind_name(),
            directions,
            bound,
        }
    }
}

/// Render the relationship document as a table.
#[must_use]
pub fn render(book: &RelationshipBook) -> String {
    let rows: Vec<RelationshipRow> = book
        .relationships()
        .iter()
        .enumerate()
        .map(|(i, r)| RelationshipRow::new(i, r))
        .collect();
    Table::new(rows).to_string()
}

/// Load the config if the file exists, otherwise fall back to defaults.
#[allow(clippy::result_large_err)]
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Config::parse_toml("")
    }
}

fn store_for(config: &Config, override_path: Option<&PathBuf>) -> RelationshipStore {
    let path = override_path
        .cloned()
        .unwrap_or_else(|| config.agent.relations_path());
    RelationshipStore::new(path)
}

/// Print every declared relationship.
#[allow(clippy::result_large_err)]
pub fn list(args: &RelationsArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = store_for(&config, args.relations.as_ref());
    let book = store.load_or_default()?;

    output::header();
    output::section("Relationships");
    output::field("Document", store.path().display());
    println!();

    if book.is_empty() {
        output::note("No relationships declared");
        output::note("Declare one with `dutchbook relations add`");
        return Ok(());
    }

    output::lines(&render(&book));
    Ok(())
}

/// Interactively declare a relationship and append it to the document.
pub async fn add(args: &RelationsArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = store_for(&config, args.relations.as_ref());
    let mut book = store.load_or_default()?;
    let client = Client::new(&config.exchange, &config.rate_limit, config.api_key.as_deref())?;
    let theme = ColorfulTheme::default();

    output::header();
    output::section("New relationship");

    let kinds = &["Equivalence", "Ordering", "General"];
    let kind = Select::with_theme(&theme)
        .with_prompt("Kind")
        .items(kinds)
        .default(0)
        .interact()?;

    let maximum = if kind == 2 {
        let maximum: f64 = Input::with_theme(&theme)
            .with_prompt("Maximum total probability (100% is 1.0)")
            .interact_text()?;
        Some(maximum)
    } else {
        None
    };

    output::note("Enter directions as `[YES|NO] <market url>`; empty line to finish");
    let mut directions = Vec::new();
    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt(format!("Direction {}", directions.len() + 1))
            .allow_empty(true)
            .interact_text()?;
        if line.trim().is_empty() {
            break;
        }

        let (outcome, target) = match parse_direction_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                output::error(&e.to_string());
                continue;
            }
        };
        let slug = slug_from_url(&target);
        match client.slug_to_id(&slug).await {
            Ok(id) => {
                output::success(&format!("{outcome} {slug} ({id})"));
                directions.push(Direction::new(id, outcome));
            }
            Err(e) => output::error(&format!("Could not resolve {slug}: {e}")),
        }
    }

    let relationship = match (kind, maximum) {
        (0, _) => Relationship::Equivalence(EquivalenceRelation::new(directions)),
        (1, _) => Relationship::Ordering(OrderingRelation::new(directions)),
        (_, maximum) => {
            Relationship::General(GeneralRelation::new(directions, maximum.unwrap_or(1.0)))
        }
    };
    relationship
        .validate(config.rate_limit.write.capacity)
        .map_err(|source| ConfigError::Relationship {
            index: book.len(),
            source,
        })?;

    book.push(relationship.clone());
    store.save(&book)?;
    output::success(&format!(
        "Added {relationship} to {}",
        store.path().display()
    ));
    Ok(())
}

/// Parse `[YES|NO] <url>`; a bare URL means YES.
#[allow(clippy::result_large_err)]
pub fn parse_direction_line(line: &str) -> Result<(Outcome, String)> {
    let segments: Vec<&str> = line.split_whitespace().collect();
    match segments.as_slice() {
        [url] => Ok((Outcome::Yes, (*url).to_string())),
        [outcome, url] => Ok((outcome.parse()?, (*url).to_string())),
        _ => Err(ConfigError::InvalidValue {
            field: "direction",
            reason: format!("expected `[YES|NO] <url>`, got `{}`", line.trim()),
        }
        .into()),
    }
}

/// Last path segment of a market URL. Bare slugs pass through.
#[must_use]
pub fn slug_from_url(target: &str) -> String {
    let path = match url::Url::parse(target) {
        Ok(url) => url.path().to_string(),
        Err(_) => target.to_string(),
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn bare_url_defaults_to_yes() {
        let (outcome, url) =
            parse_direction_line("https://manifold.markets/alice/will-it-rain").unwrap();
        assert_eq!(outcome, Outcome::Yes);
        assert_eq!(url, "https://manifold.markets/alice/will-it-rain");
    }

    #[test]
    fn explicit_outcome_is_parsed() {
        let (outcome, _) = parse_direction_line("  no https://manifold.markets/a/b ").unwrap();
        assert_eq!(outcome, Outcome::No);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(
            parse_direction_line("YES a b"),
            Err(Error::Config(ConfigError::InvalidValue { field: "direction", .. }))
        ));
        assert!(matches!(
            parse_direction_line("MAYBE https://manifold.markets/a/b"),
            Err(Error::Domain(_))
        ));
    }

    #[test]
    fn slug_is_last_path_segment() {
        assert_eq!(
            slug_from_url("https://manifold.markets/alice/will-it-rain?r=bob#comments"),
            "will-it-rain"
        );
        assert_eq!(slug_from_url("https://manifold.markets/alice/will-it-rain/"), "will-it-rain");
        assert_eq!(slug_from_url("will-it-rain"), "will-it-rain");
    }

    #[test]
    fn render_lists_every_relationship() {
        let mut book = RelationshipBook::default();
        book.push(Relationship::Equivalence(EquivalenceRelation::new(vec![
            Direction::yes("a"),
            Direction::no("b"),
        ])));
        book.push(Relationship::General(GeneralRelation::new(
            vec![Direction::yes("c")],
            0.95,
        )));

        let table = render(&book);
        assert!(table.contains("equivalence"));
        assert!(table.contains("NO b"));
        assert!(table.contains("sum <= 0.95"));
    }
}
