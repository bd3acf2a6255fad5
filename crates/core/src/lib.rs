//! Fund Core - domain entities, strategies and the weekly replay engine.
//!
//! This crate holds the simulator's business logic. It is database-agnostic
//! and defines repository traits that are implemented by the
//! `storage-sqlite` crate.

pub mod constants;
pub mod deals;
pub mod errors;
pub mod managers;
pub mod market_data;
pub mod portfolio;
pub mod setup;
pub mod simulation;
pub mod strategies;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the types most callers need
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
