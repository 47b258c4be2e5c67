use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::trade::RecommendedTrade;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to read relationships from {path}: {source}")]
    Relations {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid relationship #{index}: {source}")]
    Relationship {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Errors talking to an exchange.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("exchange returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limit token already used")]
    TokenAlreadyUsed,

    #[error("MANIFOLD_API_KEY is not set")]
    MissingApiKey,

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// A bet the exchange refused, with the batch it belonged to.
///
/// Bets placed earlier in the batch are not rolled back, so the full batch is
/// kept for manual reconciliation.
#[derive(Debug)]
pub struct TradeError {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub trade: RecommendedTrade,
    pub batch: Vec<RecommendedTrade>,
    /// Bets from `batch` that were placed before the failure.
    pub placed: usize,
}

impl fmt::Display for TradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trade failed")?;
        if let Some(status) = self.status {
            write!(f, " with status {status}")?;
        }
        if let Some(body) = &self.body {
            write!(f, ": {body}")?;
        }
        write!(
            f,
            " (bad trade: {}; {} of {} placed)",
            self.trade,
            self.placed,
            self.batch.len()
        )
    }
}

impl std::error::Error for TradeError {}

/// Execution-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Trade(Box<TradeError>),
}

impl From<TradeError> for ExecutionError {
    fn from(err: TradeError) -> Self {
        Self::Trade(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}

impl From<TradeError> for Error {
    fn from(err: TradeError) -> Self {
        Error::Execution(err.into())
    }
}
