//! Equivalence strategy.
//!
//! Equivalent directions resolve together, so their probabilities should
//! match. When they don't, buying YES on the cheapest and NO on the dearest
//! pays out one unit per share whatever happens.

use tracing::{debug, info};

use super::{PlanStep, SearchLimits, Strategy, TradePlan, DUST_SHARES};
use crate::domain::direction::Direction;
use crate::domain::market::VirtualMarket;
use crate::domain::relation::EquivalenceRelation;
use crate::domain::solver::ArbitrageSolver;

/// Exploits spreads between equivalent directions.
pub struct EquivalenceStrategy {
    relation: EquivalenceRelation,
    limits: SearchLimits,
}

impl EquivalenceStrategy {
    #[must_use]
    pub const fn new(relation: EquivalenceRelation, limits: SearchLimits) -> Self {
        Self { relation, limits }
    }

    #[must_use]
    pub const fn relation(&self) -> &EquivalenceRelation {
        &self.relation
    }

    /// Unwind a short on a cheap leg against a long on a dearer one.
    ///
    /// `size` picks the share cap from the two position sizes: `min` closes
    /// both sides evenly (exit), `max` moves as much exposure as either side
    /// allows (transfer).
    fn unwind(
        &self,
        legs: &[VirtualMarket],
        solver: &ArbitrageSolver,
        step: PlanStep,
        size: fn(f64, f64) -> f64,
    ) -> Option<TradePlan> {
        for (i, low) in legs.iter().enumerate() {
            let short = low.position();
            if short > -DUST_SHARES {
                continue;
            }
            for high in &legs[i + 1..] {
                let long = high.position();
                if long < DUST_SHARES {
                    continue;
                }
                let max_shares = size(long, -short);
                debug!(
                    step = %step,
                    low = %low,
                    high = %high,
                    short,
                    long,
                    "Trying to unwind positions"
                );
                let trades = solver.solve(&[low.clone(), high.inverse()], 1.0, max_shares);
                if !trades.is_empty() {
                    info!(step = %step, max_shares, "Found unwind opportunity");
                    return Some(TradePlan::new(step, trades));
                }
            }
        }
        None
    }

    fn open(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        let (low, high) = (legs.first()?, legs.last()?);
        let spread = high.probability() - low.probability();
        if spread <= self.relation.margin {
            debug!(spread, margin = self.relation.margin, "Spread within margin");
            return None;
        }

        let trades = solver.solve(
            &[low.clone(), high.inverse()],
            1.0 - self.relation.margin,
            self.limits.max_open_shares,
        );
        if trades.is_empty() {
            return None;
        }
        info!(spread, margin = self.relation.margin, "Found open opportunity");
        Some(TradePlan::new(PlanStep::Open, trades))
    }
}

impl Strategy for EquivalenceStrategy {
    fn name(&self) -> &'static str {
        "equivalence"
    }

    fn directions(&self) -> &[Direction] {
        &self.relation.directions
    }

    fn plan(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        let mut sorted = legs.to_vec();
        sorted.sort_by(|a, b| a.probability().total_cmp(&b.probability()));

        self.unwind(&sorted, solver, PlanStep::Exit, f64::min)
            .or_else(|| self.unwind(&sorted, solver, PlanStep::Transfer, f64::max))
            .or_else(|| self.open(&sorted, solver))
    }
}
