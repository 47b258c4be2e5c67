//! Step-wise search over one relationship.

use tracing::{debug, info};

use crate::domain::{strategy_for, ArbitrageSolver, Relationship, SearchLimits, Strategy, TradePlan};
use crate::error::Result;
use crate::exchange::MarketLoader;

/// Yields one plan per call for a single relationship.
///
/// Legs are reloaded on every step, so the caller must execute each plan
/// before advancing again. The search is exhausted once a step finds
/// nothing, or after the first plan of a one-shot strategy.
pub struct OpportunitySearch {
    label: String,
    strategy: Box<dyn Strategy>,
    solver: ArbitrageSolver,
    steps: usize,
    exhausted: bool,
}

impl OpportunitySearch {
    pub fn new(relationship: &Relationship, limits: SearchLimits) -> Self {
        Self::with_solver(relationship, limits, ArbitrageSolver::default())
    }

    pub fn with_solver(
        relationship: &Relationship,
        limits: SearchLimits,
        solver: ArbitrageSolver,
    ) -> Self {
        Self {
            label: relationship.label(),
            strategy: strategy_for(relationship, limits),
            solver,
            steps: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Plans yielded so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Start over, as if no step had run.
    pub fn restart(&mut self) {
        self.steps = 0;
        self.exhausted = false;
    }

    /// Reload the legs and propose the next plan.
    ///
    /// Returns `Ok(None)` once the search is exhausted. Read errors leave the
    /// search where it was.
    pub async fn advance_one_step(&mut self, loader: &MarketLoader<'_>) -> Result<Option<TradePlan>> {
        if self.exhausted {
            return Ok(None);
        }

        let legs = loader.load_legs(self.strategy.directions()).await?;
        let plan = self.strategy.plan(&legs, &self.solver);

        match &plan {
            Some(plan) => {
                self.steps += 1;
                info!(
                    relationship = %self.label,
                    step = %plan.step,
                    trades = plan.trades.len(),
                    investment = plan.total_investment(),
                    "Found plan"
                );
                if self.strategy.one_shot() {
                    self.exhausted = true;
                }
            }
            None => {
                debug!(relationship = %self.label, steps = self.steps, "Search exhausted");
                self.exhausted = true;
            }
        }

        Ok(plan)
    }
}
