use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Holding of one ticker by one manager at a deal date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub manager_id: String,
    pub ticker: String,
    pub quantity: Decimal,
    pub snapshot_date: NaiveDate,
}
