//! Manifold Markets exchange integration.

mod client;
mod dto;

pub use client::Client;
