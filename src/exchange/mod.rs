//! Exchange abstraction layer.
//!
//! Defines the trait exchange implementations must fulfill, the rate
//! limiter they share, and the loader that turns exchange reads into
//! priced markets.

mod loader;
pub mod rate_limiter;
mod traits;

pub use loader::MarketLoader;
pub use rate_limiter::{BucketConfig, LeakyBucket, Lease, Token};
pub use traits::{BetReceipt, BetRequest, Exchange, User};
