//! The trading loop.
//!
//! Each cycle reloads the relationship document, walks every relationship in
//! document order, and executes the plans its search yields. A relationship
//! whose markets cannot be read is logged and skipped; a rejected bet ends
//! the cycle. A failing cycle never stops the loop.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::config::Config;
use super::executor::{ExecutionOutcome, TradeExecutor};
use super::relations::RelationshipStore;
use super::search::OpportunitySearch;
use crate::domain::{PlanStep, Relationship, SearchLimits, UserId};
use crate::error::{Error, ExecutionError, Result};
use crate::exchange::{Exchange, MarketLoader};

/// Knobs for one agent run, after command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub dry_run: bool,
    /// Budget for plans that open exposure.
    pub max_cost: Decimal,
    pub iterations_per_relationship: usize,
    pub limits: SearchLimits,
    pub cycle_interval: Duration,
    /// Relationships with more legs than this are rejected up front.
    pub write_capacity: usize,
}

impl RunSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            dry_run: config.dry_run,
            max_cost: config.agent.max_cost,
            iterations_per_relationship: config.agent.iterations_per_relationship,
            limits: config.agent.search_limits(),
            cycle_interval: config.agent.cycle_interval(),
            write_capacity: config.rate_limit.write.capacity,
        }
    }

    /// Budget passed to the executor for a plan of kind `step`.
    ///
    /// Unwinding held exposure is never capped.
    #[must_use]
    pub fn budget_for(&self, step: PlanStep) -> Decimal {
        if step.opens_exposure() {
            self.max_cost
        } else {
            Decimal::MAX
        }
    }
}

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub relationships: usize,
    pub plans: usize,
    pub executed: usize,
    pub rejected: usize,
    pub errors: usize,
}

/// Runs cycles for one account on one exchange.
pub struct Orchestrator<'a> {
    exchange: &'a dyn Exchange,
    user: UserId,
    store: RelationshipStore,
    settings: RunSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        exchange: &'a dyn Exchange,
        user: UserId,
        store: RelationshipStore,
        settings: RunSettings,
    ) -> Self {
        Self {
            exchange,
            user,
            store,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run cycles until Ctrl-C, or exactly one when `once` is set.
    ///
    /// In `once` mode a failed cycle is returned as the error; otherwise it
    /// is logged and the loop continues.
    pub async fn run(&self, once: bool) -> Result<()> {
        info!(
            exchange = self.exchange.exchange_name(),
            dry_run = self.settings.dry_run,
            max_cost = %self.settings.max_cost,
            relations = %self.store.path().display(),
            "Agent starting"
        );

        loop {
            match self.run_cycle().await {
                Ok(_) => {}
                Err(e) if once => return Err(e),
                Err(e) => error!(error = %e, "Cycle failed"),
            }
            if once {
                return Ok(());
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    return Ok(());
                }
                () = tokio::time::sleep(self.settings.cycle_interval) => {}
            }
        }
    }

    /// One pass over every relationship in the document.
    ///
    /// Fails when the document cannot be loaded or does not fit the
    /// configuration, and when the exchange rejects a bet: no further bets
    /// are placed until the next cycle. Read and pricing failures are
    /// counted in the report and the cycle moves on.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let book = self.store.load()?;
        book.validate(self.settings.write_capacity).map_err(|(index, source)| {
            crate::error::ConfigError::Relationship { index, source }
        })?;

        let loader = MarketLoader::new(self.exchange, self.user.clone());
        let executor = TradeExecutor::new(self.exchange);
        let mut report = CycleReport {
            relationships: book.len(),
            ..CycleReport::default()
        };

        for relationship in book.relationships() {
            if let Err(e) = self
                .run_relationship(&relationship, &loader, &executor, &mut report)
                .await
            {
                report.errors += 1;
                if matches!(e, Error::Execution(ExecutionError::Trade(_))) {
                    error!(
                        relationship = %relationship.label(),
                        error = %e,
                        "Exchange rejected a bet; abandoning cycle"
                    );
                    return Err(e);
                }
                error!(relationship = %relationship.label(), error = %e, "Relationship failed");
            }
        }

        info!(
            relationships = report.relationships,
            plans = report.plans,
            executed = report.executed,
            rejected = report.rejected,
            errors = report.errors,
            "Cycle complete"
        );
        Ok(report)
    }

    async fn run_relationship(
        &self,
        relationship: &Relationship,
        loader: &MarketLoader<'_>,
        executor: &TradeExecutor<'_>,
        report: &mut CycleReport,
    ) -> Result<()> {
        let mut search = OpportunitySearch::new(relationship, self.settings.limits);

        for _ in 0..self.settings.iterations_per_relationship {
            let Some(plan) = search.advance_one_step(loader).await? else {
                break;
            };
            report.plans += 1;

            let budget = self.settings.budget_for(plan.step);
            let outcome = executor
                .execute(&plan.trades, self.settings.dry_run, budget)
                .await?;

            if outcome.succeeded() {
                report.executed += 1;
            } else {
                report.rejected += 1;
                if let ExecutionOutcome::Invalid(failure) = &outcome {
                    warn!(
                        relationship = %search.label(),
                        market = %failure.market_id(),
                        "Plan invalidated; retrying next cycle"
                    );
                }
                break;
            }
        }
        Ok(())
    }
}
