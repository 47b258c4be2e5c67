//! Bisection over monotonic predicates.
//!
//! The invest-effect function has no closed-form inverse, so share targets
//! are turned back into investments (and share counts into aggregate
//! probabilities) by bisecting on the forward function.

use crate::domain::market::VirtualMarket;

/// Interval width at which bisection stops.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Upper bound on halvings; reached only for non-finite bounds.
const MAX_ITERATIONS: usize = 200;

/// Find where `crossed` flips from false to true on `[lo, hi]`.
///
/// `crossed` must be monotonic: false below the crossing point and true at
/// or above it. Nothing checks this; a non-monotonic predicate yields an
/// arbitrary point in the interval. Returns the midpoint of the final
/// interval, which is narrower than `tolerance`.
pub fn bisect(mut lo: f64, mut hi: f64, tolerance: f64, mut crossed: impl FnMut(f64) -> bool) -> f64 {
    let mut iterations = 0;
    while hi - lo >= tolerance && iterations < MAX_ITERATIONS {
        let mid = lo + (hi - lo) / 2.0;
        if crossed(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
        iterations += 1;
    }
    lo + (hi - lo) / 2.0
}

/// Investment tolerance per share of target, for targets of at least one
/// share. A share costs as little as the leg's probability, so the share
/// error is the investment error divided by the price.
const INVESTMENT_TOLERANCE: f64 = DEFAULT_TOLERANCE * 1e-2;

/// Investment that buys `shares` YES shares on `market`.
///
/// Searches `[0, shares]`, which assumes every share costs less than one
/// unit of currency. That holds for any market priced strictly below 1.
/// The interval shrinks with small targets so the shares bought stay within
/// `1e-3 * shares` of the target on legs priced down to 1%.
#[must_use]
pub fn investment_for_shares(shares: f64, market: &VirtualMarket) -> f64 {
    if shares <= 0.0 {
        return 0.0;
    }
    let tolerance = INVESTMENT_TOLERANCE * shares.min(1.0);
    bisect(0.0, shares, tolerance, |investment| {
        market.invest_effect(investment).shares >= shares
    })
}

/// Probability `market` is left at after buying `shares` YES shares.
#[must_use]
pub fn probability_for_shares(shares: f64, market: &VirtualMarket) -> f64 {
    market
        .invest_effect(investment_for_shares(shares, market))
        .new_probability
}

/// Sum of post-trade probabilities if `shares` were bought on every leg.
#[must_use]
pub fn effective_probability(shares: f64, legs: &[VirtualMarket]) -> f64 {
    legs.iter()
        .map(|leg| probability_for_shares(shares, leg))
        .sum()
}
