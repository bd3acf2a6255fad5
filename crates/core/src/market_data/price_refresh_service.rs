use chrono::NaiveDate;
use fund_market_data::PriceProvider;
use log::{debug, info, warn};
use std::sync::Arc;

use super::market_data_model::{PriceObservation, RefreshReport};
use super::market_data_traits::PriceRepositoryTrait;
use super::outliers::OutlierFilter;

/// Pulls prices from a provider into the price ledger.
///
/// Failures never propagate: a ticker whose fetch or insert fails is logged,
/// recorded in the report and skipped for this window.
pub struct PriceRefreshService {
    provider: Arc<dyn PriceProvider>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    outlier_filter: Option<OutlierFilter>,
}

impl PriceRefreshService {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            provider,
            price_repository,
            outlier_filter: None,
        }
    }

    pub fn with_outlier_filter(mut self, filter: OutlierFilter) -> Self {
        self.outlier_filter = Some(filter);
        self
    }

    /// Fetches `[start, end]` for every ticker and stores the rows inside the window.
    pub async fn refresh(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> RefreshReport {
        let mut report = RefreshReport {
            start: Some(start),
            end: Some(end),
            tickers_requested: tickers.len(),
            ..Default::default()
        };

        for ticker in tickers {
            let bars = match self.provider.fetch_prices(ticker, start, end).await {
                Ok(bars) => bars,
                Err(e) if e.is_empty_result() => {
                    warn!(
                        "No prices from {} for {} between {} and {}",
                        self.provider.id(),
                        ticker,
                        start,
                        end
                    );
                    report.failures.push((ticker.clone(), e.to_string()));
                    continue;
                }
                Err(e) => {
                    warn!("Failed to fetch prices for {}: {}", ticker, e);
                    report.failures.push((ticker.clone(), e.to_string()));
                    continue;
                }
            };

            let mut rows: Vec<PriceObservation> = bars
                .into_iter()
                .map(PriceObservation::from)
                .filter(|obs| obs.date >= start && obs.date <= end && obs.is_tradable())
                .collect();
            if let Some(filter) = &self.outlier_filter {
                let before = rows.len();
                rows = filter.apply(rows);
                if rows.len() < before {
                    debug!("Dropped {} outlier prices for {}", before - rows.len(), ticker);
                }
            }
            report.rows_fetched += rows.len();
            if rows.is_empty() {
                continue;
            }

            match self.price_repository.insert_prices(rows).await {
                Ok(inserted) => {
                    debug!("Inserted {} prices for {}", inserted, ticker);
                    report.rows_inserted += inserted;
                }
                Err(e) => {
                    warn!("Failed to store prices for {}: {}", ticker, e);
                    report.failures.push((ticker.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Price refresh {}..{}: {} rows inserted for {} tickers ({} failed)",
            start,
            end,
            report.rows_inserted,
            report.tickers_requested,
            report.failures.len()
        );
        report
    }
}
