//! Domain validation errors for core domain types.
//!
//! These errors are returned when a market snapshot cannot be priced by the
//! constant-product model, or when a declared relationship is malformed.
//!
//! # Examples
//!
//! ```
//! use dutchbook::domain::error::DomainError;
//! use dutchbook::domain::market::{MarketSnapshot, Pool, RealMarket};
//! use dutchbook::domain::id::MarketId;
//!
//! let snapshot = MarketSnapshot {
//!     id: MarketId::new("m1"),
//!     slug: "m1".into(),
//!     url: String::new(),
//!     question: "Degenerate?".into(),
//!     mechanism: "cpmm-1".into(),
//!     p: 1.0, // p must lie strictly inside (0, 1)
//!     pool: Pool { yes: 100.0, no: 100.0 },
//!     probability: 0.5,
//!     total_liquidity: 100.0,
//!     is_resolved: false,
//!     close_time: None,
//! };
//!
//! let result = RealMarket::try_new(snapshot, 0.0);
//! assert!(matches!(result, Err(DomainError::DegenerateProbability { .. })));
//! ```

use thiserror::Error;

use super::id::MarketId;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The pool weight `p` is outside the open interval (0, 1).
    #[error("market {market_id} has degenerate pool weight p={p}")]
    DegenerateProbability { market_id: MarketId, p: f64 },

    /// A pool must hold a positive, finite number of shares.
    #[error("market {market_id} has invalid {side} pool {value}")]
    NonPositivePool {
        market_id: MarketId,
        side: &'static str,
        value: f64,
    },

    /// Only constant-product markets can be priced.
    #[error("market {market_id} uses mechanism '{mechanism}', expected 'cpmm-1'")]
    UnsupportedMechanism {
        market_id: MarketId,
        mechanism: String,
    },

    /// The exchange omitted a field the pricing model needs.
    #[error("market {market_id} is missing {field}")]
    IncompleteMarket {
        market_id: MarketId,
        field: &'static str,
    },

    /// Outcome strings must be YES or NO.
    #[error("unknown outcome '{value}', expected YES or NO")]
    UnknownOutcome { value: String },

    /// A relationship needs enough markets to be meaningful.
    #[error("{kind} relationship needs at least {required} directions, got {actual}")]
    TooFewDirections {
        kind: &'static str,
        required: usize,
        actual: usize,
    },

    /// Margins are probabilities and must lie in [0, 1).
    #[error("margin {margin} must lie in [0, 1)")]
    InvalidMargin { margin: f64 },

    /// The aggregate probability ceiling of a general relationship.
    #[error("maximum {maximum} must be positive")]
    InvalidMaximum { maximum: f64 },

    /// Share caps must be positive.
    #[error("max_shares {max_shares} must be positive")]
    InvalidMaxShares { max_shares: f64 },

    /// A plan with more legs than the write bucket holds could never be leased.
    #[error("relationship has {legs} legs but the write bucket only holds {capacity}")]
    TooManyLegs { legs: usize, capacity: usize },
}
