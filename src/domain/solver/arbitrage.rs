//! Balanced multi-market position sizing.
//!
//! Given legs whose YES probabilities sum to less than a target, buying the
//! same number of shares on every leg locks in a payout of at least that
//! many units whenever at most one leg can resolve YES. The solver finds the
//! share count at which the legs' post-trade probabilities sum to the target,
//! and prices each leg at that size.

use tracing::{debug, error};

use super::bisect::{bisect, effective_probability, investment_for_shares, DEFAULT_TOLERANCE};
use crate::domain::market::VirtualMarket;
use crate::domain::trade::RecommendedTrade;

/// Smallest share count worth trading.
pub const MIN_SHARES: f64 = 0.1;

/// Smallest per-leg investment worth placing.
pub const MIN_INVESTMENT: f64 = 1.0;

/// A set of legs to balance against an aggregate probability ceiling.
#[derive(Debug, Clone)]
pub struct ArbOpportunity {
    pub legs: Vec<VirtualMarket>,
    pub target_probability_sum: f64,
    pub max_shares: f64,
}

impl ArbOpportunity {
    pub fn new(legs: Vec<VirtualMarket>, target_probability_sum: f64, max_shares: f64) -> Self {
        Self {
            legs,
            target_probability_sum,
            max_shares,
        }
    }

    /// Sum of the legs' current probabilities.
    #[must_use]
    pub fn probability_sum(&self) -> f64 {
        self.legs.iter().map(VirtualMarket::probability).sum()
    }
}

/// Sizes balanced positions across legs.
#[derive(Debug, Clone)]
pub struct ArbitrageSolver {
    min_shares: f64,
    min_investment: f64,
}

impl Default for ArbitrageSolver {
    fn default() -> Self {
        Self {
            min_shares: MIN_SHARES,
            min_investment: MIN_INVESTMENT,
        }
    }
}

impl ArbitrageSolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn min_shares(&self) -> f64 {
        self.min_shares
    }

    #[must_use]
    pub const fn min_investment(&self) -> f64 {
        self.min_investment
    }

    pub fn solve_opportunity(&self, opportunity: &ArbOpportunity) -> Vec<RecommendedTrade> {
        self.solve(
            &opportunity.legs,
            opportunity.target_probability_sum,
            opportunity.max_shares,
        )
    }

    /// Trades that buy equal shares on every leg until the legs' combined
    /// probability reaches `target`, capped at `max_shares`.
    ///
    /// An empty result means there is nothing worth doing: no gap, or a
    /// position too small to place. It is never an error.
    pub fn solve(&self, legs: &[VirtualMarket], target: f64, max_shares: f64) -> Vec<RecommendedTrade> {
        let current: f64 = legs.iter().map(VirtualMarket::probability).sum();
        if legs.is_empty() || current >= target {
            debug!(current, target, "No arbitrage gap");
            return Vec::new();
        }

        let shares = bisect(0.0, max_shares, DEFAULT_TOLERANCE, |s| {
            effective_probability(s, legs) >= target
        });
        if shares < self.min_shares {
            debug!(shares, min = self.min_shares, "Opportunity below minimum size");
            return Vec::new();
        }

        let investments: Vec<f64> = legs
            .iter()
            .map(|leg| investment_for_shares(shares, leg))
            .collect();
        if let Some(smallest) = investments
            .iter()
            .copied()
            .find(|investment| *investment <= self.min_investment)
        {
            debug!(shares, investment = smallest, "Leg investment below minimum");
            return Vec::new();
        }

        let achieved = effective_probability(shares, legs);
        if achieved >= target + DEFAULT_TOLERANCE {
            error!(achieved, target, shares, "Solver overshot target probability");
            debug_assert!(
                achieved < target + DEFAULT_TOLERANCE,
                "solver overshot: {achieved} >= {target}"
            );
        }

        legs.iter()
            .zip(investments)
            .map(|(leg, investment)| {
                let effect = leg.invest_effect(investment);
                RecommendedTrade::for_leg(leg, investment, effect.shares, effect.new_probability)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::direction::Outcome;
    use crate::domain::market::RealMarket;
    use crate::testkit::domain::priced_snapshot;

    fn leg(id: &str, probability: f64, liquidity: f64) -> VirtualMarket {
        let real = RealMarket::try_new(priced_snapshot(id, probability, liquidity), 0.0).unwrap();
        VirtualMarket::Real(Arc::new(real))
    }

    #[test]
    fn no_gap_returns_nothing() {
        let legs = [leg("a", 0.5, 100.0), leg("b", 0.6, 100.0)];
        assert!(ArbitrageSolver::new().solve(&legs, 1.0, 2_000.0).is_empty());
    }

    #[test]
    fn sum_exactly_at_target_returns_nothing() {
        let legs = [leg("a", 0.5, 100.0), leg("b", 0.5, 100.0)];
        assert!(ArbitrageSolver::new().solve(&legs, 1.0, 2_000.0).is_empty());
    }

    #[test]
    fn empty_legs_return_nothing() {
        assert!(ArbitrageSolver::new().solve(&[], 1.0, 2_000.0).is_empty());
    }

    #[test]
    fn balanced_trades_close_the_gap() {
        // YES on a 40% market and NO on a 60% market sum to 0.8.
        let legs = [leg("low", 0.4, 200.0), leg("high", 0.6, 200.0).inverse()];
        let target = 0.95;
        let trades = ArbitrageSolver::new().solve(&legs, target, 2_000.0);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].outcome, Outcome::Yes);
        assert_eq!(trades[0].market.id().as_str(), "low");
        assert_eq!(trades[1].outcome, Outcome::No);
        assert_eq!(trades[1].market.id().as_str(), "high");

        let shares = trades[0].shares;
        assert!((trades[1].shares - shares).abs() <= 1e-3 * shares);
        assert!(trades.iter().all(|t| t.investment > MIN_INVESTMENT));

        let achieved = effective_probability(shares, &legs);
        assert!(achieved < target + DEFAULT_TOLERANCE);
        assert!(achieved > target - 1e-3);
    }

    #[test]
    fn guaranteed_payout_exceeds_stake() {
        let legs = [leg("low", 0.4, 200.0), leg("high", 0.6, 200.0).inverse()];
        let trades = ArbitrageSolver::new().solve(&legs, 0.95, 2_000.0);

        let stake: f64 = trades.iter().map(|t| t.investment).sum();
        let payout = trades[0].shares.min(trades[1].shares);
        assert!(payout > stake, "payout {payout} must exceed stake {stake}");
    }

    #[test]
    fn max_shares_caps_position() {
        let legs = [leg("low", 0.4, 200.0), leg("high", 0.6, 200.0).inverse()];
        let trades = ArbitrageSolver::new().solve(&legs, 0.95, 15.0);

        assert_eq!(trades.len(), 2);
        assert!(trades.iter().all(|t| t.shares <= 15.0 + 1e-3));
        assert!(trades.iter().all(|t| t.shares > 14.9));
    }

    #[test]
    fn tiny_share_cap_is_rejected() {
        let legs = [leg("low", 0.4, 200.0), leg("high", 0.6, 200.0).inverse()];
        assert!(ArbitrageSolver::new().solve(&legs, 0.95, 0.05).is_empty());
    }

    #[test]
    fn tiny_investment_is_rejected() {
        // A thin gap on deep markets needs only cents per leg.
        let legs = [leg("a", 0.499_95, 10_000.0), leg("b", 0.5, 10_000.0).inverse()];
        assert!(ArbitrageSolver::new().solve(&legs, 1.0, 2_000.0).is_empty());
    }

    #[test]
    fn solve_opportunity_uses_stored_parameters() {
        let opportunity = ArbOpportunity::new(
            vec![leg("low", 0.4, 200.0), leg("high", 0.6, 200.0).inverse()],
            0.95,
            2_000.0,
        );
        assert!((opportunity.probability_sum() - 0.8).abs() < 1e-9);
        assert_eq!(ArbitrageSolver::new().solve_opportunity(&opportunity).len(), 2);
    }
}
