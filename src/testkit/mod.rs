//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for snapshots and priced legs.
//! - [`exchange`] - [`MockExchange`](exchange::MockExchange), an in-memory
//!   CPMM exchange with failure injection.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod exchange;
