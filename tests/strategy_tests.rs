//! End-to-end strategy behavior against the in-memory exchange.

mod support;

use dutchbook::app::{OpportunitySearch, Orchestrator, TradeExecutor};
use dutchbook::domain::relation::EquivalenceRelation;
use dutchbook::domain::{Direction, Outcome, PlanStep, Relationship, SearchLimits};
use dutchbook::exchange::MarketLoader;
use dutchbook::testkit::config::settings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::market::{exchange_with, probability};
use support::relation::{book, equivalence, general, ordering, store_in};

#[tokio::test]
async fn three_way_equivalence_opens_across_extremes() {
    let exchange = exchange_with(&[("a", 0.40), ("b", 0.45), ("c", 0.60)]);
    let mut relation = EquivalenceRelation::new(vec![
        Direction::yes("a"),
        Direction::yes("b"),
        Direction::yes("c"),
    ]);
    relation.margin = 0.05;
    let relationship = Relationship::Equivalence(relation);

    let loader = MarketLoader::new(&exchange, exchange.user_id());
    let mut search = OpportunitySearch::new(&relationship, SearchLimits::default());
    let plan = search.advance_one_step(&loader).await.unwrap().unwrap();

    assert_eq!(plan.step, PlanStep::Open);
    assert_eq!(plan.trades.len(), 2);

    let (low, high) = (&plan.trades[0], &plan.trades[1]);
    assert_eq!(low.market.id().as_str(), "a");
    assert_eq!(low.outcome, Outcome::Yes);
    assert_eq!(high.market.id().as_str(), "c");
    assert_eq!(high.outcome, Outcome::No);

    // YES on a plus NO on c lands on 1 - margin.
    let combined = low.expected_probability + (1.0 - high.expected_probability);
    assert!((combined - 0.95).abs() < 1e-3, "combined probability {combined}");
    assert!((low.shares - high.shares).abs() < 1e-3);
}

#[tokio::test]
async fn opened_position_is_exited_when_prices_cross() {
    let exchange = exchange_with(&[("a", 0.40), ("b", 0.60)]);
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path(), &book(vec![equivalence(&["a", "b"])]));
    let orchestrator =
        Orchestrator::new(&exchange, exchange.user_id(), store, settings(false, dec!(1000)));

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.executed, 1);
    let long_a = exchange.position_of("a").net();
    let short_b = exchange.position_of("b").net();
    assert!(long_a > 1.0 && short_b < -1.0);

    // Someone else pushes a far above b.
    exchange.drift("a", 150.0);
    assert!(probability(&exchange, "a") > probability(&exchange, "b"));

    let relationship = equivalence(&["a", "b"]);
    let loader = MarketLoader::new(&exchange, exchange.user_id());
    let mut search = OpportunitySearch::new(&relationship, SearchLimits::default());
    let plan = search.advance_one_step(&loader).await.unwrap().unwrap();

    assert_eq!(plan.step, PlanStep::Exit);
    assert_eq!(plan.trades[0].market.id().as_str(), "b");
    assert_eq!(plan.trades[0].outcome, Outcome::Yes);
    assert_eq!(plan.trades[1].market.id().as_str(), "a");
    assert_eq!(plan.trades[1].outcome, Outcome::No);

    let outcome = TradeExecutor::new(&exchange)
        .execute(&plan.trades, false, Decimal::MAX)
        .await
        .unwrap();
    assert!(outcome.succeeded());
    assert!(exchange.position_of("a").net().abs() < 1.0);
    assert!(exchange.position_of("b").net().abs() < 1.0);
}

#[tokio::test]
async fn ordering_violation_buys_late_and_sells_early() {
    let exchange = exchange_with(&[("by-june", 0.55), ("by-december", 0.45)]);
    let relationship = ordering(&["by-june", "by-december"]);

    let loader = MarketLoader::new(&exchange, exchange.user_id());
    let mut search = OpportunitySearch::new(&relationship, SearchLimits::default());
    let plan = search.advance_one_step(&loader).await.unwrap().unwrap();

    assert_eq!(plan.step, PlanStep::Open);
    assert_eq!(plan.trades[0].market.id().as_str(), "by-december");
    assert_eq!(plan.trades[0].outcome, Outcome::Yes);
    assert_eq!(plan.trades[1].market.id().as_str(), "by-june");
    assert_eq!(plan.trades[1].outcome, Outcome::No);
}

#[tokio::test]
async fn consistent_ordering_yields_nothing() {
    let exchange = exchange_with(&[("by-june", 0.30), ("by-december", 0.45)]);
    let relationship = ordering(&["by-june", "by-december"]);

    let loader = MarketLoader::new(&exchange, exchange.user_id());
    let mut search = OpportunitySearch::new(&relationship, SearchLimits::default());

    assert!(search.advance_one_step(&loader).await.unwrap().is_none());
    assert!(search.is_exhausted());
}

#[tokio::test]
async fn general_relationship_runs_once_per_cycle() {
    let exchange = exchange_with(&[("a", 0.30), ("b", 0.60)]);
    let dir = tempfile::tempdir().unwrap();
    let relationship = general(vec![Direction::yes("a"), Direction::no("b")], 0.95);
    let store = store_in(dir.path(), &book(vec![relationship]));

    let mut run = settings(false, dec!(1000));
    run.iterations_per_relationship = 5;
    let orchestrator = Orchestrator::new(&exchange, exchange.user_id(), store, run);

    let report = orchestrator.run_cycle().await.unwrap();

    assert_eq!(report.plans, 1);
    assert_eq!(exchange.bets().len(), 2);
    let combined = probability(&exchange, "a") + (1.0 - probability(&exchange, "b"));
    assert!((combined - 0.95).abs() < 1e-3, "combined probability {combined}");
}
