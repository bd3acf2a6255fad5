//! Holdings domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::CASH_TICKER;
use crate::errors::{Error, Result, ValidationError};

/// Risk profile partitioning holdings, deals and managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBucket {
    LowRisk,
    LowTurnover,
    HyEquity,
}

impl RiskBucket {
    pub const ALL: [RiskBucket; 3] = [
        RiskBucket::LowRisk,
        RiskBucket::LowTurnover,
        RiskBucket::HyEquity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::LowRisk => "LOW_RISK",
            RiskBucket::LowTurnover => "LOW_TURNOVER",
            RiskBucket::HyEquity => "HY_EQUITY",
        }
    }
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW_RISK" => Ok(RiskBucket::LowRisk),
            "LOW_TURNOVER" => Ok(RiskBucket::LowTurnover),
            "HY_EQUITY" => Ok(RiskBucket::HyEquity),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown risk bucket '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Current holding of one ticker inside a bucket.
///
/// Keyed by `(risk_bucket, ticker)`. The `CASH` row carries uninvested funds
/// at a unit price of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub risk_bucket: RiskBucket,
    pub ticker: String,
    pub quantity: Decimal,
    pub manager_id: String,
    pub last_updated: NaiveDate,
    pub spot_price: Decimal,
}

impl Position {
    /// Builds the cash row of a bucket.
    pub fn cash(
        risk_bucket: RiskBucket,
        manager_id: impl Into<String>,
        amount: Decimal,
        last_updated: NaiveDate,
    ) -> Self {
        Self {
            risk_bucket,
            ticker: CASH_TICKER.to_string(),
            quantity: amount,
            manager_id: manager_id.into(),
            last_updated,
            spot_price: Decimal::ONE,
        }
    }

    pub fn is_cash(&self) -> bool {
        self.ticker == CASH_TICKER
    }

    pub fn market_value(&self) -> Decimal {
        self.quantity * self.spot_price
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ValidationError::MissingField("ticker".to_string()).into());
        }
        if self.quantity < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Position {}/{} has negative quantity {}",
                self.risk_bucket, self.ticker, self.quantity
            ))
            .into());
        }
        if self.spot_price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Position {}/{} has negative spot price {}",
                self.risk_bucket, self.ticker, self.spot_price
            ))
            .into());
        }
        Ok(())
    }
}

/// Splits a bucket's positions into the cash row and the invested rows.
pub fn split_cash(positions: Vec<Position>) -> (Option<Position>, Vec<Position>) {
    let mut cash = None;
    let mut invested = Vec::with_capacity(positions.len());
    for position in positions {
        if position.is_cash() {
            cash = Some(position);
        } else {
            invested.push(position);
        }
    }
    (cash, invested)
}

/// Total value of a bucket: invested market value plus cash.
pub fn bucket_value(positions: &[Position]) -> Decimal {
    positions.iter().map(Position::market_value).sum()
}
