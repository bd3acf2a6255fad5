use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily closing price returned by a provider.
///
/// Prices are adjusted closes. `sector` is only filled when the provider
/// exposes it alongside the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: Decimal,
    pub sector: Option<String>,
}

impl PriceBar {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close,
            sector: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}
