//! Database model for bucket positions.

use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fund_core::errors::Error;
use fund_core::portfolio::holdings::{Position, RiskBucket};
use fund_core::utils::time_utils::{format_date, parse_date};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub risk_type: String,
    pub ticker: String,
    pub quantity: String,
    pub manager_id: String,
    pub last_updated: String,
    pub spot_price: String,
}

impl TryFrom<PositionDB> for Position {
    type Error = Error;

    fn try_from(db: PositionDB) -> Result<Self, Self::Error> {
        Ok(Position {
            risk_bucket: RiskBucket::from_str(&db.risk_type)?,
            ticker: db.ticker,
            quantity: Decimal::from_str(&db.quantity)?,
            manager_id: db.manager_id,
            last_updated: parse_date(&db.last_updated)?,
            spot_price: Decimal::from_str(&db.spot_price)?,
        })
    }
}

impl From<&Position> for PositionDB {
    fn from(position: &Position) -> Self {
        PositionDB {
            risk_type: position.risk_bucket.as_str().to_string(),
            ticker: position.ticker.clone(),
            quantity: position.quantity.to_string(),
            manager_id: position.manager_id.clone(),
            last_updated: format_date(position.last_updated),
            spot_price: position.spot_price.to_string(),
        }
    }
}
