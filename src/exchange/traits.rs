//! Exchange trait definitions.
//!
//! These traits define the interface that any exchange implementation must provide.

use async_trait::async_trait;
use serde::Deserialize;

use super::rate_limiter::Token;
use crate::domain::{MarketId, MarketSnapshot, Outcome, PositionShares, UserId};
use crate::error::Error;

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub balance: f64,
}

/// A market order buying `amount` worth of `outcome`.
#[derive(Debug, Clone, PartialEq)]
pub struct BetRequest {
    pub market_id: MarketId,
    pub amount: f64,
    pub outcome: Outcome,
}

/// The exchange's acknowledgement of a placed bet.
#[derive(Debug, Clone, PartialEq)]
pub struct BetReceipt {
    pub bet_id: String,
    pub shares: f64,
    pub probability_after: f64,
}

/// A constant-product prediction market exchange.
///
/// Reads and writes are rate limited independently. Reads lease internally;
/// writes are leased by the caller in batches through
/// [`lease_writes`](Exchange::lease_writes) so a whole batch is admitted
/// before its first bet is placed.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// The account the exchange session is authenticated as.
    async fn me(&self) -> Result<User, Error>;

    /// Current state of a market.
    async fn market(&self, id: &MarketId) -> Result<MarketSnapshot, Error>;

    /// Resolve a market URL slug to its id.
    async fn slug_to_id(&self, slug: &str) -> Result<MarketId, Error>;

    /// Shares `user` holds on each side of `market`.
    async fn position(&self, user: &UserId, market: &MarketId) -> Result<PositionShares, Error>;

    /// Lease `count` write slots, waiting until the write bucket admits them.
    async fn lease_writes(&self, count: usize) -> Vec<Token>;

    /// Place a bet, spending `token`.
    async fn place_bet(&self, bet: &BetRequest, token: &mut Token) -> Result<BetReceipt, Error>;

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}
