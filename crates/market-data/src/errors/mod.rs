//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching prices from a provider.
///
/// Fetches are never retried: callers log the error and skip the ticker
/// for the current cycle.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available for the requested date range.
    /// The symbol exists but has no prices in the specified period.
    #[error("No data for date range")]
    NoDataForRange,

    /// The requested range is malformed (start after end).
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange { start: String, end: String },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// Data validation failed.
    /// The provider returned data that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },
}

impl MarketDataError {
    /// Returns true when the provider answered but had nothing to return.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::NoDataForRange)
    }
}
