//! In-memory state store for the timeline platform.
//!
//! Implements the repository traits from `timeline-core` over concurrent
//! maps. Useful for development, testing and simple deployments where
//! persistence is not required.

#![forbid(unsafe_code)]

pub mod repositories;
pub use repositories::{InMemoryStore, InMemoryUserDirectory};
