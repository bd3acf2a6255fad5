//! Price provider trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::PriceBar;

/// Trait for daily price providers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use fund_market_data::{PriceBar, PriceProvider, MarketDataError};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl PriceProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_prices(
///         &self,
///         ticker: &str,
///         start: NaiveDate,
///         end: NaiveDate,
///     ) -> Result<Vec<PriceBar>, MarketDataError> {
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch daily closing prices for `ticker`.
    ///
    /// # Arguments
    ///
    /// * `ticker` - Provider symbol (e.g. "AAPL", "BTC-USD")
    /// * `start` - Start of the date range (inclusive)
    /// * `end` - End of the date range (inclusive)
    ///
    /// # Returns
    ///
    /// Bars ordered by date ascending, or a `MarketDataError` on failure.
    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError>;
}
