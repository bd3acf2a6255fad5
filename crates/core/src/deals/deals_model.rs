//! Deal log domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::holdings::RiskBucket;

/// Direction of an executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Side implied by a signed quantity change, `None` for zero.
    pub fn from_delta(delta: Decimal) -> Option<Self> {
        if delta > Decimal::ZERO {
            Some(TradeSide::Buy)
        } else if delta < Decimal::ZERO {
            Some(TradeSide::Sell)
        } else {
            None
        }
    }

    /// Applies the side's sign to an unsigned quantity.
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            TradeSide::Buy => quantity,
            TradeSide::Sell => -quantity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown trade type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// An executed trade as recorded in the deal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub risk_bucket: RiskBucket,
    pub ticker: String,
    pub execution_date: NaiveDate,
    pub manager_id: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Deal {
    pub fn signed_quantity(&self) -> Decimal {
        self.side.signed(self.quantity)
    }
}

/// A trade decided by a strategy, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub risk_bucket: RiskBucket,
    pub ticker: String,
    pub execution_date: NaiveDate,
    pub manager_id: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl NewDeal {
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ValidationError::MissingField("ticker".to_string()).into());
        }
        if self.manager_id.trim().is_empty() {
            return Err(ValidationError::MissingField("manager_id".to_string()).into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Deal quantity must be positive, got {} for {}",
                self.quantity, self.ticker
            ))
            .into());
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Deal price must not be negative, got {} for {}",
                self.price, self.ticker
            ))
            .into());
        }
        Ok(())
    }

    /// Cash flow of the deal from the bucket's point of view.
    ///
    /// Buys are negative, sells positive.
    pub fn cash_flow(&self) -> Decimal {
        -self.side.signed(self.quantity) * self.price
    }
}
