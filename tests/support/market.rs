//! Exchange fixtures.

use dutchbook::testkit::exchange::MockExchange;

/// Liquidity used for every fixture market.
pub const LIQUIDITY: f64 = 300.0;

/// A mock exchange holding one market per `(id, probability)`.
pub fn exchange_with(markets: &[(&str, f64)]) -> MockExchange {
    let exchange = MockExchange::new();
    for (id, probability) in markets {
        exchange.add_market_with_probability(id, *probability, LIQUIDITY);
    }
    exchange
}

/// Current model probability of market `id`.
pub fn probability(exchange: &MockExchange, id: &str) -> f64 {
    exchange
        .snapshot(id)
        .map(|s| s.model_probability())
        .unwrap_or(f64::NAN)
}
