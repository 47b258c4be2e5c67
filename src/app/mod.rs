//! Application layer - orchestration, configuration, and persistence.

mod config;
mod executor;
mod logging;
mod orchestrator;
pub mod paths;
mod relations;
mod search;

pub use config::{AgentConfig, Config, ExchangeConfig, RateLimitConfig, API_KEY_ENV};
pub use executor::{ExecutionOutcome, TradeExecutor, ValidationFailure};
pub use logging::LoggingConfig;
pub use orchestrator::{CycleReport, Orchestrator, RunSettings};
pub use relations::RelationshipStore;
pub use search::OpportunitySearch;
