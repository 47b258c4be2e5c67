//! Building priced markets from exchange reads.

use std::sync::Arc;

use tracing::debug;

use super::Exchange;
use crate::domain::{Direction, MarketId, MarketSnapshot, RealMarket, UserId, VirtualMarket};
use crate::error::Result;

/// Reads markets and positions for one account.
///
/// Every call goes to the exchange; nothing is cached between calls, so a
/// loader can be reused across attempts without serving stale positions.
pub struct MarketLoader<'a> {
    exchange: &'a dyn Exchange,
    user: UserId,
}

impl<'a> MarketLoader<'a> {
    pub fn new(exchange: &'a dyn Exchange, user: UserId) -> Self {
        Self { exchange, user }
    }

    #[must_use]
    pub fn exchange(&self) -> &'a dyn Exchange {
        self.exchange
    }

    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Latest snapshot, without a position read.
    pub async fn latest_snapshot(&self, id: &MarketId) -> Result<MarketSnapshot> {
        self.exchange.market(id).await
    }

    /// Snapshot and position, read together.
    pub async fn load(&self, id: &MarketId) -> Result<RealMarket> {
        let snapshot = self.exchange.market(id).await?;
        let position = self.exchange.position(&self.user, id).await?.net();
        debug!(market = %id, position, "Loaded market");
        Ok(RealMarket::try_new(snapshot, position)?)
    }

    /// `market` with its position read again.
    pub async fn refresh_position(&self, market: &RealMarket) -> Result<RealMarket> {
        let position = self.exchange.position(&self.user, market.id()).await?.net();
        Ok(market.with_position(position))
    }

    /// One leg per direction, in order.
    pub async fn load_legs(&self, directions: &[Direction]) -> Result<Vec<VirtualMarket>> {
        let mut legs = Vec::with_capacity(directions.len());
        for direction in directions {
            let market = self.load(&direction.id).await?;
            legs.push(VirtualMarket::from_outcome(Arc::new(market), direction.outcome));
        }
        Ok(legs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;
    use crate::testkit::exchange::MockExchange;

    #[tokio::test]
    async fn load_legs_follows_directions() {
        let exchange = MockExchange::new();
        exchange.add_market_with_probability("a", 0.3, 100.0);
        exchange.add_market_with_probability("b", 0.8, 100.0);
        exchange.set_position("b", 0.0, 7.0);

        let loader = MarketLoader::new(&exchange, exchange.user_id());
        let legs = loader
            .load_legs(&[Direction::yes("a"), Direction::no("b")])
            .await
            .unwrap();

        assert_eq!(legs[0].base_outcome(), Outcome::Yes);
        assert!((legs[0].probability() - 0.3).abs() < 1e-9);
        assert_eq!(legs[1].base_outcome(), Outcome::No);
        assert!((legs[1].probability() - 0.2).abs() < 1e-9);
        assert_eq!(legs[1].position(), 7.0);
    }

    #[tokio::test]
    async fn refresh_position_reads_again() {
        let exchange = MockExchange::new();
        exchange.add_market_with_probability("a", 0.5, 100.0);
        let loader = MarketLoader::new(&exchange, exchange.user_id());

        let market = loader.load(&MarketId::from("a")).await.unwrap();
        assert_eq!(market.read_cached_position(), 0.0);

        exchange.set_position("a", 12.0, 0.0);
        assert_eq!(market.read_cached_position(), 0.0);

        let refreshed = loader.refresh_position(&market).await.unwrap();
        assert_eq!(refreshed.read_cached_position(), 12.0);
    }

    #[tokio::test]
    async fn unknown_market_is_an_error() {
        let exchange = MockExchange::new();
        let loader = MarketLoader::new(&exchange, exchange.user_id());
        assert!(loader.load(&MarketId::from("missing")).await.is_err());
    }
}
