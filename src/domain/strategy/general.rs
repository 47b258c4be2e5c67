//! General strategy: directions whose probabilities must sum to at most a
//! declared maximum. Solved once per search.

use tracing::info;

use super::{PlanStep, Strategy, TradePlan};
use crate::domain::direction::Direction;
use crate::domain::market::VirtualMarket;
use crate::domain::relation::GeneralRelation;
use crate::domain::solver::ArbitrageSolver;

pub struct GeneralStrategy {
    relation: GeneralRelation,
}

impl GeneralStrategy {
    #[must_use]
    pub const fn new(relation: GeneralRelation) -> Self {
        Self { relation }
    }
}

impl Strategy for GeneralStrategy {
    fn name(&self) -> &'static str {
        "general"
    }

    fn directions(&self) -> &[Direction] {
        &self.relation.directions
    }

    fn plan(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        let trades = solver.solve(legs, self.relation.maximum, self.relation.max_shares);
        if trades.is_empty() {
            return None;
        }
        info!(maximum = self.relation.maximum, legs = legs.len(), "Found general opportunity");
        Some(TradePlan::new(PlanStep::General, trades))
    }

    fn one_shot(&self) -> bool {
        true
    }
}
