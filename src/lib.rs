//! Dutchbook - Relationship-driven arbitrage on constant-product prediction markets.
//!
//! The operator declares how markets relate (two markets describe the same
//! event, a set of markets should be ordered by probability, or a set of
//! outcomes cannot all happen). When live prices contradict a declared
//! relationship, dutchbook computes the bets that push the prices back into
//! line and places them.
//!
//! # Architecture
//!
//! - **`domain`** - Pure pricing math and decision logic
//!   - `market` - Constant-product pricing and the inverse market view
//!   - `solver` - Bisection and the arbitrage solver
//!   - `strategy` - Equivalence, ordering, and general relationship strategies
//!
//! - **`exchange`** - Exchange abstraction, rate limiting, and market loading
//! - **`adapter`** - Manifold Markets REST implementation of the exchange
//! - **`app`** - Configuration, validation-then-execution, and the trading loop
//! - **`cli`** - The `dutchbook` command-line interface
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use dutchbook::domain::{
//!     ArbitrageSolver, MarketId, MarketSnapshot, Pool, RealMarket, VirtualMarket,
//! };
//!
//! fn market(id: &str, yes: f64, no: f64) -> VirtualMarket {
//!     let snapshot = MarketSnapshot {
//!         id: MarketId::from(id),
//!         slug: id.into(),
//!         url: String::new(),
//!         question: String::new(),
//!         mechanism: "cpmm-1".into(),
//!         p: 0.5,
//!         pool: Pool { yes, no },
//!         probability: no / (yes + no),
//!         total_liquidity: 100.0,
//!         is_resolved: false,
//!         close_time: None,
//!     };
//!     VirtualMarket::Real(Arc::new(RealMarket::try_new(snapshot, 0.0).unwrap()))
//! }
//!
//! // 40% and 60% on the same event: buy YES low and NO high.
//! let low = market("low", 120.0, 80.0);
//! let high = market("high", 80.0, 120.0);
//! let trades = ArbitrageSolver::default().solve(&[low, high.inverse()], 0.99, 2000.0);
//! assert_eq!(trades.len(), 2);
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod exchange;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
