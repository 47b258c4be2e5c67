//! Ordering strategy.
//!
//! Directions are declared in ascending order of probability: if an earlier
//! direction resolves YES, every later one does too. A leg priced above a
//! later leg is a violation, corrected by buying YES on the later leg and NO
//! on the earlier one.

use tracing::{debug, info};

use super::{PlanStep, SearchLimits, Strategy, TradePlan, DUST_SHARES};
use crate::domain::direction::Direction;
use crate::domain::market::VirtualMarket;
use crate::domain::relation::OrderingRelation;
use crate::domain::solver::ArbitrageSolver;

/// Exploits monotonicity violations in an ordered list of directions.
pub struct OrderingStrategy {
    relation: OrderingRelation,
    limits: SearchLimits,
}

impl OrderingStrategy {
    #[must_use]
    pub const fn new(relation: OrderingRelation, limits: SearchLimits) -> Self {
        Self { relation, limits }
    }

    #[must_use]
    pub const fn relation(&self) -> &OrderingRelation {
        &self.relation
    }

    /// Pairs `(i, j)` with `i < j` where leg `i` is priced above leg `j`.
    fn violations(legs: &[VirtualMarket]) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..legs.len()).flat_map(move |i| {
            (i + 1..legs.len())
                .filter(move |&j| legs[i].probability() > legs[j].probability())
                .map(move |j| (i, j))
        })
    }

    fn transfer(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        for (i, j) in Self::violations(legs) {
            let (early, late) = (&legs[i], &legs[j]);
            let long_early = early.position();
            let short_late = -late.position();
            if long_early < DUST_SHARES && short_late < DUST_SHARES {
                continue;
            }

            let max_shares = long_early.max(short_late);
            debug!(early = %early, late = %late, max_shares, "Trying to transfer exposure");
            let trades = solver.solve(&[late.clone(), early.inverse()], 1.0, max_shares);
            if !trades.is_empty() {
                info!(max_shares, "Found transfer opportunity");
                return Some(TradePlan::new(PlanStep::Transfer, trades));
            }
        }
        None
    }

    fn open(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        let gap = |&(i, j): &(usize, usize)| legs[i].probability() - legs[j].probability();
        let widest = Self::violations(legs).max_by(|a, b| gap(a).total_cmp(&gap(b)))?;

        let spread = gap(&widest);
        if spread <= self.relation.margin {
            debug!(spread, margin = self.relation.margin, "Violation within margin");
            return None;
        }

        let (early, late) = (&legs[widest.0], &legs[widest.1]);
        let trades = solver.solve(
            &[late.clone(), early.inverse()],
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

impl Strategy for OrderingStrategy {
    fn name(&self) -> &'static str {
        "ordering"
    }

    fn directions(&self) -> &[Direction] {
        &self.relation.directions
    }

    fn plan(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan> {
        self.transfer(legs, solver)
            .or_else(|| self.open(legs, solver))
    }
}
