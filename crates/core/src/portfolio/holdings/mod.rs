//! Holdings store - current positions per risk bucket.

mod holdings_model;
mod holdings_traits;

pub use holdings_model::*;
pub use holdings_traits::HoldingsRepositoryTrait;

#[cfg(test)]
mod holdings_model_tests;
