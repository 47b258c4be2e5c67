//! Leaky-bucket admission control.
//!
//! Each admitted request raises the bucket level by one; the level drains
//! continuously at a fixed rate. A request that would overflow the bucket is
//! told how long to wait instead. Admitted requests receive single-use
//! [`Token`]s that the caller consumes when the request is actually sent.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ExchangeError;

/// Extra sleep after a computed wait, absorbing clock granularity.
const WAIT_BUFFER: Duration = Duration::from_millis(50);

/// Capacity and drain rate of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BucketConfig {
    /// Requests the bucket holds before callers must wait.
    pub capacity: usize,
    /// Requests drained per second.
    pub drain_rate: f64,
}

/// A leased slot in a bucket. Consuming it twice is an error.
#[derive(Debug, Default)]
pub struct Token {
    used: bool,
}

impl Token {
    fn new() -> Self {
        Self::default()
    }

    /// Mark the slot as spent.
    pub fn consume(&mut self) -> Result<(), ExchangeError> {
        if self.used {
            return Err(ExchangeError::TokenAlreadyUsed);
        }
        self.used = true;
        Ok(())
    }

    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }
}

/// Result of a lease attempt.
#[derive(Debug)]
pub enum Lease {
    Granted(Vec<Token>),
    /// Retry after this long.
    Wait(Duration),
}

#[derive(Debug)]
struct BucketState {
    level: f64,
    last_update: Instant,
}

/// A leaky bucket shared by every caller of one traffic class.
#[derive(Debug)]
pub struct LeakyBucket {
    name: &'static str,
    capacity: usize,
    drain_rate: f64,
    state: Mutex<BucketState>,
}

impl LeakyBucket {
    pub fn new(name: &'static str, config: BucketConfig) -> Self {
        Self {
            name,
            capacity: config.capacity,
            drain_rate: config.drain_rate,
            state: Mutex::new(BucketState {
                level: 0.0,
                last_update: Instant::now(),
            }),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current level, without draining.
    #[must_use]
    pub fn level(&self) -> f64 {
        self.state.lock().level
    }

    pub fn lease(&self, count: usize) -> Lease {
        self.lease_at(count, Instant::now())
    }

    /// Lease `count` slots as of `now`.
    pub fn lease_at(&self, count: usize, now: Instant) -> Lease {
        let mut state = self.state.lock();

        let elapsed = now.saturating_duration_since(state.last_update);
        state.level = (state.level - elapsed.as_secs_f64() * self.drain_rate).max(0.0);
        state.last_update = state.last_update.max(now);

        let requested = count as f64;
        let capacity = self.capacity as f64;
        if state.level + requested <= capacity {
            state.level += requested;
            return Lease::Granted((0..count).map(|_| Token::new()).collect());
        }

        let wait = (state.level + requested - capacity) / self.drain_rate;
        Lease::Wait(Duration::try_from_secs_f64(wait).unwrap_or(Duration::MAX))
    }

    /// Whether `count` slots were granted. Granted slots are spent.
    pub fn allow(&self, count: usize) -> bool {
        matches!(self.lease(count), Lease::Granted(_))
    }

    /// Lease `count` slots, sleeping until the bucket has room.
    ///
    /// Never returns if `count` exceeds the capacity; configuration
    /// validation keeps batch sizes within it.
    pub async fn block_until_allowed(&self, count: usize) -> Vec<Token> {
        loop {
            match self.lease(count) {
                Lease::Granted(tokens) => {
                    debug!(bucket = self.name, count, "Leased rate limit tokens");
                    return tokens;
                }
                Lease::Wait(wait) => {
                    let sleep = wait.saturating_add(WAIT_BUFFER);
                    info!(
                        bucket = self.name,
                        count,
                        wait_secs = sleep.as_secs_f64(),
                        "Sleeping until rate limit tokens are available"
                    );
                    tokio::time::sleep(sleep).await;
                }
            }
        }
    }
}
