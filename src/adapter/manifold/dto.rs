//! Manifold API wire types.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MarketId, MarketSnapshot, Outcome, Pool, PositionShares};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDto {
    pub id: MarketId,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub question: String,
    pub mechanism: String,
    /// Absent on non-CPMM markets.
    #[serde(default)]
    pub p: Option<f64>,
    #[serde(default)]
    pub pool: Option<Pool>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub total_liquidity: Option<f64>,
    #[serde(default)]
    pub is_resolved: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub close_time: Option<i64>,
}

impl MarketDto {
    /// Convert to a snapshot, filling missing CPMM fields with values that
    /// market validation rejects.
    #[must_use]
    pub fn into_snapshot(self) -> MarketSnapshot {
        let pool = self.pool.unwrap_or(Pool { yes: 0.0, no: 0.0 });
        MarketSnapshot {
            id: self.id,
            slug: self.slug,
            url: self.url,
            question: self.question,
            mechanism: self.mechanism,
            p: self.p.unwrap_or(f64::NAN),
            pool,
            probability: self.probability.unwrap_or(f64::NAN),
            total_liquidity: self.total_liquidity.unwrap_or(0.0),
            is_resolved: self.is_resolved,
            close_time: self.close_time.and_then(millis_to_datetime),
        }
    }
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[derive(Debug, Deserialize)]
pub struct SlugDto {
    pub id: MarketId,
}

/// One entry of `GET /market/{id}/positions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    #[serde(default)]
    pub total_shares: TotalSharesDto,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalSharesDto {
    #[serde(rename = "YES", default)]
    pub yes: f64,
    #[serde(rename = "NO", default)]
    pub no: f64,
}

/// Sum the share counts of every position entry.
#[must_use]
pub fn position_shares(entries: &[PositionDto]) -> PositionShares {
    entries
        .iter()
        .fold(PositionShares::default(), |mut acc, entry| {
            acc.yes += entry.total_shares.yes;
            acc.no += entry.total_shares.no;
            acc
        })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetDto<'a> {
    pub contract_id: &'a MarketId,
    pub amount: f64,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetDto {
    #[serde(default)]
    pub bet_id: String,
    #[serde(default)]
    pub shares: f64,
    #[serde(default)]
    pub prob_after: f64,
}
