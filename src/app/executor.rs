//! Validate-then-execute pipeline for trade plans.
//!
//! A batch is placed only if every market it touches is unchanged since the
//! plan was computed and the batch fits the budget. Bets are then placed one
//! at a time, in order, each with its own write token.

use std::fmt;

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::domain::{MarketId, RecommendedTrade};
use crate::error::{Error, ExchangeError, Result, TradeError};
use crate::exchange::{BetReceipt, BetRequest, Exchange};

/// Why a batch was rejected before anything was placed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    ProbabilityMoved {
        market_id: MarketId,
        expected: f64,
        actual: f64,
    },
    Resolved {
        market_id: MarketId,
    },
    Closed {
        market_id: MarketId,
    },
    LiquidityChanged {
        market_id: MarketId,
        expected: f64,
        actual: f64,
    },
}

impl ValidationFailure {
    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        match self {
            Self::ProbabilityMoved { market_id, .. }
            | Self::Resolved { market_id }
            | Self::Closed { market_id }
            | Self::LiquidityChanged { market_id, .. } => market_id,
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityMoved {
                market_id,
                expected,
                actual,
            } => write!(f, "market {market_id} moved from {expected:.6} to {actual:.6}"),
            Self::Resolved { market_id } => write!(f, "market {market_id} has resolved"),
            Self::Closed { market_id } => write!(f, "market {market_id} is closed"),
            Self::LiquidityChanged {
                market_id,
                expected,
                actual,
            } => write!(
                f,
                "market {market_id} liquidity changed from {expected:.2} to {actual:.2}"
            ),
        }
    }
}

/// What happened to a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Every bet was placed.
    Executed {
        receipts: Vec<BetReceipt>,
        total_cost: Decimal,
    },
    /// Validated and within budget; nothing was sent.
    DryRun { trades: usize, total_cost: Decimal },
    /// A market changed since the plan was computed.
    Invalid(ValidationFailure),
    /// The batch's net cost exceeds the budget.
    TooExpensive {
        total_cost: Decimal,
        max_cost: Decimal,
    },
}

impl ExecutionOutcome {
    /// Whether the batch passed validation and the budget.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Executed { .. } | Self::DryRun { .. })
    }
}

/// Places trade batches on one exchange.
pub struct TradeExecutor<'a> {
    exchange: &'a dyn Exchange,
}

impl<'a> TradeExecutor<'a> {
    pub fn new(exchange: &'a dyn Exchange) -> Self {
        Self { exchange }
    }

    /// Validate, cost, and place `trades`.
    ///
    /// Validation and budget failures are outcomes, not errors. An exchange
    /// rejection mid-batch is an error carrying the whole batch; bets placed
    /// before it stay placed.
    pub async fn execute(
        &self,
        trades: &[RecommendedTrade],
        dry_run: bool,
        max_cost: Decimal,
    ) -> Result<ExecutionOutcome> {
        if let Some(failure) = self.validate(trades).await? {
            warn!(reason = %failure, trades = trades.len(), "Validation failed on trades");
            for trade in trades {
                warn!(trade = %trade, "Rejected trade");
            }
            return Ok(ExecutionOutcome::Invalid(failure));
        }

        let net_cost: f64 = trades.iter().map(RecommendedTrade::net_cost).sum();
        let total_cost = Decimal::from_f64(net_cost).unwrap_or(Decimal::MAX).round_dp(6);
        let mode = if dry_run { "Dry run" } else { "Making" };
        info!(mode, trades = trades.len(), total_cost = %total_cost, "Costed trades");

        if total_cost > max_cost {
            info!(total_cost = %total_cost, max_cost = %max_cost, "Trades are too expensive");
            return Ok(ExecutionOutcome::TooExpensive {
                total_cost,
                max_cost,
            });
        }

        let mut tokens = self.exchange.lease_writes(trades.len()).await;
        let mut receipts = Vec::with_capacity(trades.len());
        for (index, (trade, token)) in trades.iter().zip(tokens.iter_mut()).enumerate() {
            info!(mode, trade = %trade, "Placing trade");
            if dry_run {
                continue;
            }

            let bet = BetRequest {
                market_id: trade.market.id().clone(),
                amount: trade.investment,
                outcome: trade.outcome,
            };
            match self.exchange.place_bet(&bet, token).await {
                Ok(receipt) => receipts.push(receipt),
                Err(err) => {
                    let err = trade_error(err, trade, trades, index);
                    error!(error = %err, "Trade failed; batch left partially placed");
                    return Err(err.into());
                }
            }
        }

        if dry_run {
            Ok(ExecutionOutcome::DryRun {
                trades: trades.len(),
                total_cost,
            })
        } else {
            Ok(ExecutionOutcome::Executed {
                receipts,
                total_cost,
            })
        }
    }

    /// First way in which a trade's market differs from its plan-time read.
    async fn validate(&self, trades: &[RecommendedTrade]) -> Result<Option<ValidationFailure>> {
        let now = Utc::now();
        for trade in trades {
            let planned = &trade.market;
            let latest = self.exchange.market(planned.id()).await?;
            let market_id = planned.id().clone();

            let expected = planned.probability();
            let actual = latest.model_probability();
            if actual != expected {
                return Ok(Some(ValidationFailure::ProbabilityMoved {
                    market_id,
                    expected,
                    actual,
                }));
            }
            if latest.is_resolved {
                return Ok(Some(ValidationFailure::Resolved { market_id }));
            }
            if latest.is_closed_at(now) {
                return Ok(Some(ValidationFailure::Closed { market_id }));
            }
            if latest.total_liquidity != planned.total_liquidity() {
                return Ok(Some(ValidationFailure::LiquidityChanged {
                    market_id,
                    expected: planned.total_liquidity(),
                    actual: latest.total_liquidity,
                }));
            }
        }
        Ok(None)
    }
}

fn trade_error(
    err: Error,
    trade: &RecommendedTrade,
    batch: &[RecommendedTrade],
    placed: usize,
) -> TradeError {
    let (status, body) = match err {
        Error::Exchange(ExchangeError::Api { status, body }) => (Some(status), Some(body)),
        other => (None, Some(other.to_string())),
    };
    TradeError {
        status,
        body,
        trade: trade.clone(),
        batch: batch.to_vec(),
        placed,
    }
}
