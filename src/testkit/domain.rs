//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`MarketSnapshot`] and
//! [`VirtualMarket`] so tests focus on assertions rather than construction
//! boilerplate.

use std::sync::Arc;

use crate::domain::{MarketId, MarketSnapshot, Pool, RealMarket, VirtualMarket, CPMM_MECHANISM};

/// A CPMM snapshot with explicit weight and pools.
pub fn snapshot(id: &str, p: f64, yes: f64, no: f64) -> MarketSnapshot {
    let probability = crate::domain::raw_probability(p, yes, no);
    MarketSnapshot {
        id: MarketId::from(id),
        slug: id.to_string(),
        url: format!("https://manifold.markets/test/{id}"),
        question: format!("Will {id} happen?"),
        mechanism: CPMM_MECHANISM.to_string(),
        p,
        pool: Pool { yes, no },
        probability,
        total_liquidity: (yes * no).sqrt(),
        is_resolved: false,
        close_time: None,
    }
}

/// A `p = 0.5` snapshot priced at `probability` with `liquidity` as its
/// geometric-mean pool depth.
pub fn priced_snapshot(id: &str, probability: f64, liquidity: f64) -> MarketSnapshot {
    let mut snap = snapshot(
        id,
        0.5,
        2.0 * liquidity * (1.0 - probability),
        2.0 * liquidity * probability,
    );
    snap.total_liquidity = liquidity;
    snap
}

/// A real leg priced at `probability` holding `position` shares.
pub fn leg(id: &str, probability: f64, liquidity: f64, position: f64) -> VirtualMarket {
    let market = RealMarket::try_new(priced_snapshot(id, probability, liquidity), position)
        .unwrap_or_else(|e| panic!("invalid test market {id}: {e}"));
    VirtualMarket::Real(Arc::new(market))
}

/// Create a [`MarketId`] from a string.
pub fn market_id(id: &str) -> MarketId {
    MarketId::from(id)
}
