//! In-memory CPMM exchange.
//!
//! [`MockExchange`] prices bets with the same invest-effect math as the
//! solver, so executed plans move markets exactly as predicted. Failures,
//! external price moves, and resolutions can be injected between calls.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::domain::{priced_snapshot, snapshot};
use crate::domain::{
    MarketId, MarketSnapshot, Outcome, PositionShares, RealMarket, UserId, VirtualMarket,
};
use crate::error::{Error, ExchangeError};
use crate::exchange::{BetReceipt, BetRequest, BucketConfig, Exchange, LeakyBucket, Token, User};

#[derive(Debug, Default)]
struct MockState {
    markets: HashMap<MarketId, MarketSnapshot>,
    positions: HashMap<MarketId, PositionShares>,
    slugs: HashMap<String, MarketId>,
    bets: Vec<BetRequest>,
    market_reads: usize,
    /// Zero-based bet attempt to reject, with status and body.
    failure: Option<(usize, u16, String)>,
    attempts: usize,
}

/// An exchange holding markets and positions in memory.
pub struct MockExchange {
    user: User,
    writes: LeakyBucket,
    state: Mutex<MockState>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    pub fn new() -> Self {
        Self::with_write_bucket(BucketConfig {
            capacity: 1_000,
            drain_rate: 1_000.0,
        })
    }

    pub fn with_write_bucket(config: BucketConfig) -> Self {
        Self {
            user: User {
                id: UserId::from("mock-user"),
                username: "mock".to_string(),
                balance: 1_000.0,
            },
            writes: LeakyBucket::new("write", config),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id.clone()
    }

    pub fn add_snapshot(&self, snapshot: MarketSnapshot) {
        let mut state = self.state.lock();
        state.slugs.insert(snapshot.slug.clone(), snapshot.id.clone());
        state.markets.insert(snapshot.id.clone(), snapshot);
    }

    pub fn add_market(&self, id: &str, p: f64, yes: f64, no: f64) {
        self.add_snapshot(snapshot(id, p, yes, no));
    }

    pub fn add_market_with_probability(&self, id: &str, probability: f64, liquidity: f64) {
        self.add_snapshot(priced_snapshot(id, probability, liquidity));
    }

    pub fn set_position(&self, id: &str, yes: f64, no: f64) {
        self.state
            .lock()
            .positions
            .insert(MarketId::from(id), PositionShares { yes, no });
    }

    pub fn snapshot(&self, id: &str) -> Option<MarketSnapshot> {
        self.state.lock().markets.get(&MarketId::from(id)).cloned()
    }

    pub fn position_of(&self, id: &str) -> PositionShares {
        self.state
            .lock()
            .positions
            .get(&MarketId::from(id))
            .copied()
            .unwrap_or_default()
    }

    /// Someone else buys YES for `investment` on market `id`.
    pub fn drift(&self, id: &str, investment: f64) {
        let mut state = self.state.lock();
        if let Some(snap) = state.markets.get_mut(&MarketId::from(id)) {
            apply_bet(snap, Outcome::Yes, investment);
        }
    }

    pub fn resolve(&self, id: &str) {
        self.update(id, |snap| snap.is_resolved = true);
    }

    pub fn close(&self, id: &str) {
        self.update(id, |snap| {
            snap.close_time = Some(Utc::now() - chrono::Duration::hours(1));
        });
    }

    pub fn set_liquidity(&self, id: &str, total_liquidity: f64) {
        self.update(id, |snap| snap.total_liquidity = total_liquidity);
    }

    /// Reject the `nth` bet attempt (zero-based) with an API error.
    pub fn fail_bet(&self, nth: usize, status: u16, body: &str) {
        self.state.lock().failure = Some((nth, status, body.to_string()));
    }

    /// Bets accepted so far, in order.
    pub fn bets(&self) -> Vec<BetRequest> {
        self.state.lock().bets.clone()
    }

    pub fn market_reads(&self) -> usize {
        self.state.lock().market_reads
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut MarketSnapshot)) {
        if let Some(snap) = self.state.lock().markets.get_mut(&MarketId::from(id)) {
            f(snap);
        }
    }
}

/// Apply a bet to a snapshot's pools, returning the shares bought.
fn apply_bet(snap: &mut MarketSnapshot, outcome: Outcome, amount: f64) -> f64 {
    let Ok(real) = RealMarket::try_new(snap.clone(), 0.0) else {
        return 0.0;
    };
    let view = VirtualMarket::from_outcome(Arc::new(real), outcome);
    let effect = view.invest_effect(amount);
    match outcome {
        Outcome::Yes => {
            snap.pool.yes = effect.yes_pool_after;
            snap.pool.no = effect.no_pool_after;
        }
        Outcome::No => {
            snap.pool.no = effect.yes_pool_after;
            snap.pool.yes = effect.no_pool_after;
        }
    }
    snap.probability = snap.model_probability();
    effect.shares
}

fn not_found(what: &str, key: &str) -> Error {
    ExchangeError::Api {
        status: 404,
        body: format!("{what} {key} not found"),
    }
    .into()
}

#[async_trait]
impl Exchange for MockExchange {
    async fn me(&self) -> Result<User, Error> {
        Ok(self.user.clone())
    }

    async fn market(&self, id: &MarketId) -> Result<MarketSnapshot, Error> {
        let mut state = self.state.lock();
        state.market_reads += 1;
        state
            .markets
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("market", id.as_str()))
    }

    async fn slug_to_id(&self, slug: &str) -> Result<MarketId, Error> {
        self.state
            .lock()
            .slugs
            .get(slug)
            .cloned()
            .ok_or_else(|| not_found("slug", slug))
    }

    async fn position(&self, _user: &UserId, market: &MarketId) -> Result<PositionShares, Error> {
        Ok(self
            .state
            .lock()
            .positions
            .get(market)
            .copied()
            .unwrap_or_default())
    }

    async fn lease_writes(&self, count: usize) -> Vec<Token> {
        self.writes.block_until_allowed(count).await
    }

    async fn place_bet(&self, bet: &BetRequest, token: &mut Token) -> Result<BetReceipt, Error> {
        token.consume()?;

        let mut state = self.state.lock();
        let attempt = state.attempts;
        state.attempts += 1;
        if let Some((nth, status, body)) = &state.failure {
            if *nth == attempt {
                return Err(ExchangeError::Api {
                    status: *status,
                    body: body.clone(),
                }
                .into());
            }
        }

        let snap = state
            .markets
            .get_mut(&bet.market_id)
            .ok_or_else(|| not_found("market", bet.market_id.as_str()))?;
        let shares = apply_bet(snap, bet.outcome, bet.amount);
        let probability_after = snap.probability;

        let position = state.positions.entry(bet.market_id.clone()).or_default();
        match bet.outcome {
            Outcome::Yes => position.yes += shares,
            Outcome::No => position.no += shares,
        }
        state.bets.push(bet.clone());

        Ok(BetReceipt {
            bet_id: format!("bet-{attempt}"),
            shares,
            probability_after,
        })
    }

    fn exchange_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_bet_moves_probability_down() {
        let exchange = MockExchange::new();
        exchange.add_market_with_probability("m", 0.6, 100.0);

        let mut tokens = exchange.lease_writes(1).await;
        let bet = BetRequest {
            market_id: MarketId::from("m"),
            amount: 10.0,
            outcome: Outcome::No,
        };
        let receipt = exchange.place_bet(&bet, &mut tokens[0]).await.unwrap();

        assert!(receipt.shares > 10.0);
        assert!(receipt.probability_after < 0.6);
        assert_eq!(exchange.position_of("m").no, receipt.shares);
    }

    #[tokio::test]
    async fn injected_failure_rejects_that_attempt() {
        let exchange = MockExchange::new();
        exchange.add_market_with_probability("m", 0.5, 100.0);
        exchange.fail_bet(0, 503, "busy");

        let mut tokens = exchange.lease_writes(2).await;
        let bet = BetRequest {
            market_id: MarketId::from("m"),
            amount: 5.0,
            outcome: Outcome::Yes,
        };
        let err = exchange.place_bet(&bet, &mut tokens[0]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Exchange(ExchangeError::Api { status: 503, .. })
        ));
        assert!(exchange.place_bet(&bet, &mut tokens[1]).await.is_ok());
    }

    #[tokio::test]
    async fn spent_token_is_rejected() {
        let exchange = MockExchange::new();
        exchange.add_market_with_probability("m", 0.5, 100.0);

        let mut tokens = exchange.lease_writes(1).await;
        let bet = BetRequest {
            market_id: MarketId::from("m"),
            amount: 5.0,
            outcome: Outcome::Yes,
        };
        exchange.place_bet(&bet, &mut tokens[0]).await.unwrap();
        let err = exchange.place_bet(&bet, &mut tokens[0]).await.unwrap_err();
        assert!(matches!(err, Error::Exchange(ExchangeError::TokenAlreadyUsed)));
    }
}
