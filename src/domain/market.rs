//! Constant-product market model.
//!
//! Every market priced here follows the weighted constant-product rule
//! `C = y^p · n^(1-p)`, where `y` and `n` are the YES and NO pools and `p` is
//! the pool weight. Trades move the pools but conserve `C`.
//!
//! - [`MarketSnapshot`] - The exchange's view of a market at read time
//! - [`RealMarket`] - A validated snapshot plus the position read with it
//! - [`VirtualMarket`] - A real market, or its YES/NO-swapped inverse
//! - [`InvestEffect`] - Result of buying YES with a given investment
//!
//! # Example
//!
//! ```
//! use dutchbook::domain::market::invest_effect;
//!
//! // p = 0.5 with 100 shares in each pool prices YES at 50%.
//! let effect = invest_effect(0.5, 100.0, 100.0, 10.0);
//! assert!((effect.shares - 19.0909).abs() < 1e-3);
//! assert!(effect.new_probability > 0.5);
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::direction::Outcome;
use super::error::DomainError;
use super::id::MarketId;

/// Mechanism tag of constant-product binary markets.
pub const CPMM_MECHANISM: &str = "cpmm-1";

/// Implied probability of YES for pool weight `p` and pools `y`, `n`.
#[must_use]
pub fn raw_probability(p: f64, y: f64, n: f64) -> f64 {
    p * n / ((1.0 - p) * y + p * n)
}

/// The conserved market constant `y^p · n^(1-p)`.
#[must_use]
pub fn market_constant(p: f64, y: f64, n: f64) -> f64 {
    y.powf(p) * n.powf(1.0 - p)
}

/// Outcome of investing in YES on a constant-product market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestEffect {
    /// YES shares received.
    pub shares: f64,
    /// Implied YES probability after the trade.
    pub new_probability: f64,
    /// YES pool after the trade.
    pub yes_pool_after: f64,
    /// NO pool after the trade.
    pub no_pool_after: f64,
}

/// Effect of investing `investment` in YES.
///
/// The investment mints that many YES and NO shares into the pools, then the
/// YES pool shrinks until the market constant is restored; the surplus YES
/// shares go to the buyer.
///
/// Callers must pass `p` strictly inside (0, 1) and positive pools.
/// [`RealMarket::try_new`] enforces this for exchange data.
#[must_use]
pub fn invest_effect(p: f64, y: f64, n: f64, investment: f64) -> InvestEffect {
    debug_assert!(p > 0.0 && p < 1.0, "degenerate pool weight {p}");
    debug_assert!(investment >= 0.0, "negative investment {investment}");

    let constant = market_constant(p, y, n);
    let yes_minted = y + investment;
    let no_after = n + investment;
    let yes_after = (constant / no_after.powf(1.0 - p)).powf(1.0 / p);

    InvestEffect {
        shares: yes_minted - yes_after,
        new_probability: raw_probability(p, yes_after, no_after),
        yes_pool_after: yes_after,
        no_pool_after: no_after,
    }
}

/// YES and NO liquidity pools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "YES")]
    pub yes: f64,
    #[serde(rename = "NO")]
    pub no: f64,
}

/// Shares a user holds on each side of one market.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionShares {
    pub yes: f64,
    pub no: f64,
}

impl PositionShares {
    /// Signed position: positive for net YES, negative for net NO.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.yes - self.no
    }
}

/// The exchange's view of one market at the time it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub id: MarketId,
    pub slug: String,
    pub url: String,
    pub question: String,
    pub mechanism: String,
    pub p: f64,
    pub pool: Pool,
    /// Probability as reported by the exchange.
    pub probability: f64,
    pub total_liquidity: f64,
    pub is_resolved: bool,
    pub close_time: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Whether trading had closed at `now`.
    #[must_use]
    pub fn is_closed_at(&self, now: DateTime<Utc>) -> bool {
        self.close_time.is_some_and(|close| close <= now)
    }

    /// Probability implied by the pool state.
    #[must_use]
    pub fn model_probability(&self) -> f64 {
        raw_probability(self.p, self.pool.yes, self.pool.no)
    }
}

/// A market backed by exchange data.
///
/// The position is captured once, when the instance is built. A fresh read
/// always produces a new instance (see [`RealMarket::with_position`]);
/// nothing refreshes implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RealMarket {
    snapshot: MarketSnapshot,
    position: f64,
}

impl RealMarket {
    /// Validate a snapshot and attach the signed position read with it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` for non-CPMM mechanisms, `p` outside (0, 1),
    /// or pools that are not positive and finite.
    pub fn try_new(snapshot: MarketSnapshot, position: f64) -> Result<Self, DomainError> {
        if snapshot.mechanism != CPMM_MECHANISM {
            return Err(DomainError::UnsupportedMechanism {
                market_id: snapshot.id.clone(),
                mechanism: snapshot.mechanism.clone(),
            });
        }
        if !(snapshot.p > 0.0 && snapshot.p < 1.0) {
            return Err(DomainError::DegenerateProbability {
                market_id: snapshot.id.clone(),
                p: snapshot.p,
            });
        }
        for (side, value) in [("YES", snapshot.pool.yes), ("NO", snapshot.pool.no)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DomainError::NonPositivePool {
                    market_id: snapshot.id.clone(),
                    side,
                    value,
                });
            }
        }

        Ok(Self { snapshot, position })
    }

    #[must_use]
    pub fn id(&self) -> &MarketId {
        &self.snapshot.id
    }

    #[must_use]
    pub const fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.snapshot.url
    }

    #[must_use]
    pub fn total_liquidity(&self) -> f64 {
        self.snapshot.total_liquidity
    }

    #[must_use]
    pub fn p(&self) -> f64 {
        self.snapshot.p
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.snapshot.pool.yes
    }

    #[must_use]
    pub fn n(&self) -> f64 {
        self.snapshot.pool.no
    }

    /// Implied YES probability from the pool state.
    #[must_use]
    pub fn probability(&self) -> f64 {
        raw_probability(self.p(), self.y(), self.n())
    }

    /// Signed position captured when this instance was built.
    #[must_use]
    pub const fn read_cached_position(&self) -> f64 {
        self.position
    }

    /// Same snapshot with a freshly read position.
    #[must_use]
    pub fn with_position(&self, position: f64) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
            position,
        }
    }
}

impl fmt::Display for RealMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.snapshot.url.is_empty() {
            write!(f, "market {}", self.snapshot.id)
        } else {
            f.write_str(&self.snapshot.url)
        }
    }
}

/// A market as seen by the solver.
///
/// `Inverse` resolves YES exactly when its base resolves NO, with the pools
/// swapped and the weight mirrored. Both variants share the base through an
/// `Arc`, so taking an inverse never copies or moves the underlying market.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualMarket {
    Real(Arc<RealMarket>),
    Inverse(Arc<RealMarket>),
}

impl VirtualMarket {
    /// View `market` from the given side.
    #[must_use]
    pub fn from_outcome(market: Arc<RealMarket>, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Yes => Self::Real(market),
            Outcome::No => Self::Inverse(market),
        }
    }

    /// The real market underneath either variant.
    #[must_use]
    pub fn base(&self) -> &Arc<RealMarket> {
        match self {
            Self::Real(base) | Self::Inverse(base) => base,
        }
    }

    /// Side of the base market that buying "YES" here actually buys.
    #[must_use]
    pub const fn base_outcome(&self) -> Outcome {
        match self {
            Self::Real(_) => Outcome::Yes,
            Self::Inverse(_) => Outcome::No,
        }
    }

    #[must_use]
    pub fn p(&self) -> f64 {
        match self {
            Self::Real(base) => base.p(),
            Self::Inverse(base) => 1.0 - base.p(),
        }
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        match self {
            Self::Real(base) => base.y(),
            Self::Inverse(base) => base.n(),
        }
    }

    #[must_use]
    pub fn n(&self) -> f64 {
        match self {
            Self::Real(base) => base.n(),
            Self::Inverse(base) => base.y(),
        }
    }

    /// Signed position in this view.
    #[must_use]
    pub fn position(&self) -> f64 {
        match self {
            Self::Real(base) => base.read_cached_position(),
            Self::Inverse(base) => -base.read_cached_position(),
        }
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        raw_probability(self.p(), self.y(), self.n())
    }

    /// The market constant `C`.
    #[must_use]
    pub fn constant(&self) -> f64 {
        market_constant(self.p(), self.y(), self.n())
    }

    /// Effect of investing in YES on this view.
    #[must_use]
    pub fn invest_effect(&self, investment: f64) -> InvestEffect {
        invest_effect(self.p(), self.y(), self.n(), investment)
    }

    /// The complementary view. `m.inverse().inverse() == m`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::Real(base) => Self::Inverse(Arc::clone(base)),
            Self::Inverse(base) => Self::Real(Arc::clone(base)),
        }
    }
}

impl fmt::Display for VirtualMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(base) => write!(f, "{base}"),
            Self::Inverse(base) => write!(f, "NOT {base}"),
        }
    }
}
