//! Outcomes and user-declared directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MarketId;

/// One side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// The other side of the market.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Wire representation used by the exchange.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(DomainError::UnknownOutcome {
                value: s.to_string(),
            }),
        }
    }
}

/// A claim about one market: "this market, read from this side".
///
/// A `NO` direction means the relationship talks about the market's
/// complement, so the solver works on the inverse view of that market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub id: MarketId,
    pub outcome: Outcome,
}

impl Direction {
    pub fn new(id: impl Into<MarketId>, outcome: Outcome) -> Self {
        Self {
            id: id.into(),
            outcome,
        }
    }

    pub fn yes(id: impl Into<MarketId>) -> Self {
        Self::new(id, Outcome::Yes)
    }

    pub fn no(id: impl Into<MarketId>) -> Self {
        Self::new(id, Outcome::No)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.outcome, self.id)
    }
}
