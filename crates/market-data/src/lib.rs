//! Fund Market Data Crate
//!
//! Provider-agnostic daily price fetching for the fund simulator.
//!
//! # Core Types
//!
//! - [`PriceProvider`] - Trait implemented by every price source
//! - [`PriceBar`] - A daily adjusted close for one ticker
//! - [`YahooProvider`] - Yahoo Finance implementation
//! - [`MarketDataError`] - Provider error taxonomy

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::PriceBar;
pub use provider::yahoo::YahooProvider;
pub use provider::PriceProvider;
