//! Manifold REST API client.
//!
//! Every request leases a token from the read or write bucket before it is
//! sent, and every GET carries a random cache-busting parameter so proxies
//! never serve a stale market.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use super::dto::{position_shares, BetDto, MarketDto, PlaceBetDto, PositionDto, SlugDto};
use crate::app::{ExchangeConfig, RateLimitConfig};
use crate::domain::{MarketId, MarketSnapshot, PositionShares, UserId};
use crate::error::{ConfigError, Error, ExchangeError, Result};
use crate::exchange::{BetReceipt, BetRequest, Exchange, LeakyBucket, Token, User};

/// Query parameter carrying a fresh UUID on every GET.
const CACHE_BUSTER: &str = "dutchbook_cachebuster";

/// HTTP client for the Manifold API.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    reads: LeakyBucket,
    writes: LeakyBucket,
}

impl Client {
    /// Build a client. Without an API key only public reads succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(
        exchange: &ExchangeConfig,
        rate_limit: &RateLimitConfig,
        api_key: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Key {key}")).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "MANIFOLD_API_KEY",
                    reason: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_millis(exchange.connect_timeout_ms))
            .timeout(Duration::from_millis(exchange.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: exchange.api_url.trim_end_matches('/').to_string(),
            reads: LeakyBucket::new("read", rate_limit.read),
            writes: LeakyBucket::new("write", rate_limit.write),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut token = next_token(&self.reads).await;
        token.consume()?;

        let cache_buster = Uuid::new_v4().to_string();
        let request = self
            .http
            .get(self.url(path))
            .query(query)
            .query(&[(CACHE_BUSTER, cache_buster.as_str())]);
        debug!(path, "GET");
        send(request).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: &mut Token,
    ) -> Result<T> {
        token.consume()?;
        debug!(path, "POST");
        send(self.http.post(self.url(path)).json(body)).await
    }
}

async fn next_token(bucket: &LeakyBucket) -> Token {
    bucket
        .block_until_allowed(1)
        .await
        .pop()
        .unwrap_or_default()
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status.is_client_error() || status.is_server_error() {
        return Err(ExchangeError::Api {
            status: status.as_u16(),
            body,
        }
        .into());
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl Exchange for Client {
    async fn me(&self) -> Result<User> {
        self.get("me", &[]).await
    }

    async fn market(&self, id: &MarketId) -> Result<MarketSnapshot> {
        let market: MarketDto = self.get(&format!("market/{id}"), &[]).await?;
        Ok(market.into_snapshot())
    }

    async fn slug_to_id(&self, slug: &str) -> Result<MarketId> {
        let market: SlugDto = self.get(&format!("slug/{slug}"), &[]).await?;
        Ok(market.id)
    }

    async fn position(&self, user: &UserId, market: &MarketId) -> Result<PositionShares> {
        let entries: Vec<PositionDto> = self
            .get(&format!("market/{market}/positions"), &[("userId", user.as_str())])
            .await?;
        Ok(position_shares(&entries))
    }

    async fn lease_writes(&self, count: usize) -> Vec<Token> {
        self.writes.block_until_allowed(count).await
    }

    async fn place_bet(&self, bet: &BetRequest, token: &mut Token) -> Result<BetReceipt> {
        let body = PlaceBetDto {
            contract_id: &bet.market_id,
            amount: bet.amount,
            outcome: bet.outcome,
        };
        let placed: BetDto = self.post("bet", &body, token).await?;
        info!(
            market = %bet.market_id,
            outcome = %bet.outcome,
            amount = bet.amount,
            bet_id = %placed.bet_id,
            shares = placed.shares,
            "Bet placed"
        );
        Ok(BetReceipt {
            bet_id: placed.bet_id,
            shares: placed.shares,
            probability_after: placed.prob_after,
        })
    }

    fn exchange_name(&self) -> &'static str {
        "manifold"
    }
}
