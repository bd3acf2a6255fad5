use async_trait::async_trait;
use chrono::NaiveDate;

use super::market_data_model::PriceObservation;
use crate::errors::Result;

/// Read/append access to the price ledger.
///
/// Every read is bounded by an `as_of` date so a strategy only sees prices
/// known at the simulated date. Results are ordered by date ascending.
#[async_trait]
pub trait PriceRepositoryTrait: Send + Sync {
    /// The last `limit` observations dated on or before `as_of`.
    fn get_recent_prices(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PriceObservation>>;

    /// Every observation dated on or before `as_of`.
    fn get_price_history(&self, ticker: &str, as_of: NaiveDate) -> Result<Vec<PriceObservation>>;

    /// The most recent observation dated on or before `as_of`.
    fn get_latest_price(&self, ticker: &str, as_of: NaiveDate) -> Result<Option<PriceObservation>>;

    /// Appends observations, ignoring rows whose `(ticker, date)` already exists.
    ///
    /// Returns the number of rows actually inserted.
    async fn insert_prices(&self, prices: Vec<PriceObservation>) -> Result<usize>;
}
