//! Numeric solvers over constant-product markets.
//!
//! - [`bisect`] - Root finding on monotonic predicates, and the share and
//!   probability inversions built on it
//! - [`arbitrage`] - Sizing one balanced position across several legs

pub mod arbitrage;
pub mod bisect;

pub use arbitrage::{ArbOpportunity, ArbitrageSolver, MIN_INVESTMENT, MIN_SHARES};
pub use bisect::{
    bisect, effective_probability, investment_for_shares, probability_for_shares,
    DEFAULT_TOLERANCE,
};
