//! Exchange-agnostic domain logic.
//!
//! Pricing math, the solvers built on it, and the strategies that turn
//! declared relationships into trades. Nothing here performs I/O; market
//! state arrives as snapshots and leaves as [`RecommendedTrade`]s.

pub mod direction;
pub mod error;
pub mod id;
pub mod market;
pub mod relation;
pub mod solver;
pub mod strategy;
pub mod trade;

pub use direction::{Direction, Outcome};
pub use error::DomainError;
pub use id::{MarketId, UserId};
pub use market::{
    invest_effect, market_constant, raw_probability, InvestEffect, MarketSnapshot, Pool,
    PositionShares, RealMarket, VirtualMarket, CPMM_MECHANISM,
};
pub use relation::{
    EquivalenceRelation, GeneralRelation, OrderingRelation, Relationship, RelationshipBook,
};
pub use solver::{ArbOpportunity, ArbitrageSolver};
pub use strategy::{strategy_for, PlanStep, SearchLimits, Strategy, TradePlan};
pub use trade::RecommendedTrade;
