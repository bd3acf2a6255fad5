//! Yahoo Finance price provider.
//!
//! Fetches daily adjusted closes through the `yahoo_finance_api` connector.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::PriceBar;
use crate::provider::PriceProvider;

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance price provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Start of `date` in UTC, as expected by the Yahoo API.
    fn day_start(date: NaiveDate) -> OffsetDateTime {
        let seconds = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        OffsetDateTime::from_unix_timestamp(seconds).unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    /// Convert a Yahoo quote into a bar, or `None` when the close is unusable.
    fn to_bar(ticker: &str, quote: &yahoo::Quote) -> Result<Option<PriceBar>, MarketDataError> {
        let timestamp: DateTime<Utc> = Utc
            .timestamp_opt(quote.timestamp as i64, 0)
            .single()
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", quote.timestamp),
            })?;

        // NaN and infinite closes do not convert and are dropped.
        let close = match Decimal::from_f64_retain(quote.adjclose) {
            Some(close) if close > Decimal::ZERO => close,
            _ => return Ok(None),
        };

        Ok(Some(PriceBar::new(ticker, timestamp.date_naive(), close)))
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        debug!(
            "Fetching daily prices for {} from {} to {} from Yahoo",
            ticker, start, end
        );

        // Yahoo treats the end bound as exclusive.
        let end_exclusive = end.succ_opt().unwrap_or(end);
        let response = self
            .connector
            .get_quote_history(ticker, Self::day_start(start), Self::day_start(end_exclusive))
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    MarketDataError::SymbolNotFound(ticker.to_string())
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        match response.quotes() {
            Ok(quotes) => {
                let mut bars = Vec::with_capacity(quotes.len());
                for quote in &quotes {
                    match Self::to_bar(ticker, quote) {
                        Ok(Some(bar)) => bars.push(bar),
                        Ok(None) => debug!("Dropping unusable close for {}", ticker),
                        Err(e) => warn!("Skipping quote due to conversion error: {:?}", e),
                    }
                }
                bars.sort_by_key(|b| b.date);
                bars.dedup_by_key(|b| b.date);

                if bars.is_empty() {
                    return Err(MarketDataError::NoDataForRange);
                }
                Ok(bars)
            }
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes returned for '{}' between {} and {}",
                    ticker, start, end
                );
                Err(MarketDataError::NoDataForRange)
            }
            Err(e) => Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
