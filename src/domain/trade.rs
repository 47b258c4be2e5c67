//! Trades recommended by the solver.

use std::fmt;
use std::sync::Arc;

use super::direction::Outcome;
use super::market::{RealMarket, VirtualMarket};

/// One bet to place on a real market.
///
/// The solver works on virtual legs; a trade is always expressed against
/// the real market underneath, with the side flipped for inverse legs.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedTrade {
    pub market: Arc<RealMarket>,
    pub investment: f64,
    pub outcome: Outcome,
    /// YES probability of `market` expected after the bet fills.
    pub expected_probability: f64,
    pub shares: f64,
}

impl RecommendedTrade {
    /// Express a buy on `leg` as a trade on its real market.
    ///
    /// `new_probability` is the leg's post-trade probability as the solver
    /// computed it, in the leg's own orientation.
    #[must_use]
    pub fn for_leg(leg: &VirtualMarket, investment: f64, shares: f64, new_probability: f64) -> Self {
        let outcome = leg.base_outcome();
        let expected_probability = match outcome {
            Outcome::Yes => new_probability,
            Outcome::No => 1.0 - new_probability,
        };
        Self {
            market: Arc::clone(leg.base()),
            investment,
            outcome,
            expected_probability,
            shares,
        }
    }

    /// Shares already held on the other side of this trade.
    #[must_use]
    pub fn opposing_position(&self) -> f64 {
        let position = self.market.read_cached_position();
        match self.outcome {
            Outcome::Yes => (-position).max(0.0),
            Outcome::No => position.max(0.0),
        }
    }

    /// Investment minus the capital returned by closing opposing shares.
    ///
    /// A YES share and a NO share on the same market redeem for one unit, so
    /// buying into an opposing position frees that much of the stake.
    #[must_use]
    pub fn net_cost(&self) -> f64 {
        self.investment - self.shares.min(self.opposing_position())
    }
}

impl fmt::Display for RecommendedTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} // M{:.2} {} for {:.2} shares to {:.4}",
            self.market, self.investment, self.outcome, self.shares, self.expected_probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::snapshot;

    fn real(position: f64) -> Arc<RealMarket> {
        Arc::new(RealMarket::try_new(snapshot("m", 0.5, 100.0, 100.0), position).unwrap())
    }

    #[test]
    fn inverse_leg_becomes_no_trade() {
        let leg = VirtualMarket::Inverse(real(0.0));
        let trade = RecommendedTrade::for_leg(&leg, 12.0, 20.0, 0.58);

        assert_eq!(trade.outcome, Outcome::No);
        assert!((trade.expected_probability - 0.42).abs() < 1e-12);
        assert!(Arc::ptr_eq(&trade.market, leg.base()));
    }

    #[test]
    fn real_leg_keeps_yes() {
        let leg = VirtualMarket::Real(real(0.0));
        let trade = RecommendedTrade::for_leg(&leg, 12.0, 20.0, 0.58);

        assert_eq!(trade.outcome, Outcome::Yes);
        assert_eq!(trade.expected_probability, 0.58);
    }

    #[test]
    fn net_cost_credits_opposing_position() {
        let long_yes = real(8.0);
        let trade = RecommendedTrade {
            market: long_yes,
            investment: 10.0,
            outcome: Outcome::No,
            expected_probability: 0.45,
            shares: 18.0,
        };
        assert_eq!(trade.opposing_position(), 8.0);
        assert_eq!(trade.net_cost(), 2.0);
    }

    #[test]
    fn net_cost_is_full_investment_without_opposing_shares() {
        let trade = RecommendedTrade {
            market: real(8.0),
            investment: 10.0,
            outcome: Outcome::Yes,
            expected_probability: 0.55,
            shares: 18.0,
        };
        assert_eq!(trade.opposing_position(), 0.0);
        assert_eq!(trade.net_cost(), 10.0);
    }

    #[test]
    fn display_reads_like_a_ticket() {
        let mut snap = snapshot("m", 0.5, 100.0, 100.0);
        snap.url = "https://manifold.markets/a/will-it".into();
        let market = Arc::new(RealMarket::try_new(snap, 0.0).unwrap());
        let trade = RecommendedTrade {
            market,
            investment: 10.0,
            outcome: Outcome::Yes,
            expected_probability: 0.547_51,
            shares: 19.090_9,
        };
        assert_eq!(
            trade.to_string(),
            "https://manifold.markets/a/will-it // M10.00 YES for 19.09 shares to 0.5475"
        );
    }
}
