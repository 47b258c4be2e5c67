//! Relationship strategies.
//!
//! A strategy turns one declared relationship into trade plans. Each call
//! to [`Strategy::plan`] looks at freshly loaded legs and proposes at most
//! one plan; the caller executes it, reloads, and asks again. Positions held
//! from earlier plans are unwound before new exposure is opened.
//!
//! - [`EquivalenceStrategy`] - Exit, then transfer, then open
//! - [`OrderingStrategy`] - Transfer, then open
//! - [`GeneralStrategy`] - A single solve at the declared maximum
//!
//! # Example
//!
//! ```
//! use dutchbook::domain::relation::{EquivalenceRelation, Relationship};
//! use dutchbook::domain::strategy::{strategy_for, SearchLimits};
//! use dutchbook::domain::Direction;
//!
//! let relationship = Relationship::Equivalence(EquivalenceRelation::new(vec![
//!     Direction::yes("a"),
//!     Direction::yes("b"),
//! ]));
//! let strategy = strategy_for(&relationship, SearchLimits::default());
//! assert_eq!(strategy.name(), "equivalence");
//! assert!(!strategy.one_shot());
//! ```

pub mod equivalence;
pub mod general;
pub mod ordering;

pub use equivalence::EquivalenceStrategy;
pub use general::GeneralStrategy;
pub use ordering::OrderingStrategy;

use std::fmt;

use super::direction::Direction;
use super::market::VirtualMarket;
use super::relation::{Relationship, DEFAULT_MAX_SHARES};
use super::solver::ArbitrageSolver;
use super::trade::RecommendedTrade;

/// Which step of a strategy produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// Close offsetting positions of equal size.
    Exit,
    /// Shift held exposure toward the correctly priced side.
    Transfer,
    /// Open a new position across a price gap.
    Open,
    /// A general relationship's single solve.
    General,
}

impl PlanStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Transfer => "transfer",
            Self::Open => "open",
            Self::General => "general",
        }
    }

    /// Whether the step opens exposure and is therefore bounded by margin
    /// and the open-share cap.
    #[must_use]
    pub const fn opens_exposure(self) -> bool {
        matches!(self, Self::Open | Self::General)
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trades proposed for one relationship.
#[derive(Debug, Clone)]
pub struct TradePlan {
    pub step: PlanStep,
    pub trades: Vec<RecommendedTrade>,
}

impl TradePlan {
    pub fn new(step: PlanStep, trades: Vec<RecommendedTrade>) -> Self {
        Self { step, trades }
    }

    /// Total investment before crediting opposing positions.
    #[must_use]
    pub fn total_investment(&self) -> f64 {
        self.trades.iter().map(|t| t.investment).sum()
    }
}

/// Bounds shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    /// Share cap for steps that open new exposure.
    pub max_open_shares: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_open_shares: DEFAULT_MAX_SHARES,
        }
    }
}

/// Turns a declared relationship into trade plans.
pub trait Strategy: Send + Sync {
    /// Unique identifier for logging.
    fn name(&self) -> &'static str;

    /// Directions to load legs for, in declaration order.
    fn directions(&self) -> &[Direction];

    /// Propose the next plan for legs loaded from [`directions`](Self::directions).
    ///
    /// `legs[k]` must be the leg for `directions()[k]`. Returns `None` when
    /// nothing is worth doing.
    fn plan(&self, legs: &[VirtualMarket], solver: &ArbitrageSolver) -> Option<TradePlan>;

    /// Whether the relationship yields at most one plan per search.
    fn one_shot(&self) -> bool {
        false
    }
}

/// Build the strategy for `relationship`.
pub fn strategy_for(relationship: &Relationship, limits: SearchLimits) -> Box<dyn Strategy> {
    match relationship {
        Relationship::Equivalence(r) => Box::new(EquivalenceStrategy::new(r.clone(), limits)),
        Relationship::Ordering(r) => Box::new(OrderingStrategy::new(r.clone(), limits)),
        Relationship::General(r) => Box::new(GeneralStrategy::new(r.clone())),
    }
}

/// Smallest position, in shares, worth unwinding.
pub(crate) const DUST_SHARES: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relation::{GeneralRelation, OrderingRelation};

    #[test]
    fn test_strategy_for_picks_matching_kind() {
        let directions = vec![Direction::yes("a"), Direction::yes("b")];
        let ordering = Relationship::Ordering(OrderingRelation::new(directions.clone()));
        let general = Relationship::General(GeneralRelation::new(directions, 1.0));

        let s = strategy_for(&ordering, SearchLimits::default());
        assert_eq!(s.name(), "ordering");
        assert_eq!(s.directions().len(), 2);

        let s = strategy_for(&general, SearchLimits::default());
        assert_eq!(s.name(), "general");
        assert!(s.one_shot());
    }

    #[test]
    fn test_open_steps_are_bounded() {
        assert!(PlanStep::Open.opens_exposure());
        assert!(PlanStep::General.opens_exposure());
        assert!(!PlanStep::Exit.opens_exposure());
        assert!(!PlanStep::Transfer.opens_exposure());
    }
}
