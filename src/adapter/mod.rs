//! Exchange implementations.

pub mod manifold;
