//! Price ledger domain models.

use chrono::NaiveDate;
use fund_market_data::PriceBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A daily price recorded in the price ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub ticker: String,
    pub date: NaiveDate,
    pub price: Decimal,
    pub sector: Option<String>,
}

impl PriceObservation {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, price: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            price,
            sector: None,
        }
    }

    /// A price that can be used for valuation and trading.
    pub fn is_tradable(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

impl From<PriceBar> for PriceObservation {
    fn from(bar: PriceBar) -> Self {
        Self {
            ticker: bar.ticker,
            date: bar.date,
            price: bar.close,
            sector: bar.sector,
        }
    }
}

/// Outcome of a price refresh over a date window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub tickers_requested: usize,
    pub rows_fetched: usize,
    pub rows_inserted: usize,
    /// `(ticker, error message)` for every ticker that was skipped.
    pub failures: Vec<(String, String)>,
}
