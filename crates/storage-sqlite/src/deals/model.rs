//! Database model for the deal log.

use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use fund_core::deals::{Deal, NewDeal, TradeSide};
use fund_core::errors::Error;
use fund_core::portfolio::holdings::RiskBucket;
use fund_core::utils::time_utils::{format_date, parse_date};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::deals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DealDB {
    pub id: String,
    pub risk_type: String,
    pub ticker: String,
    pub execution_date: String,
    pub manager_id: String,
    pub trade_type: String,
    pub quantity: String,
    pub buy_price: String,
}

impl DealDB {
    /// Row for a new deal with a time-ordered id.
    pub fn from_new(deal: &NewDeal) -> Self {
        DealDB {
            id: Uuid::now_v7().to_string(),
            risk_type: deal.risk_bucket.as_str().to_string(),
            ticker: deal.ticker.clone(),
            execution_date: format_date(deal.execution_date),
            manager_id: deal.manager_id.clone(),
            trade_type: deal.side.as_str().to_string(),
            quantity: deal.quantity.to_string(),
            buy_price: deal.price.to_string(),
        }
    }
}

impl TryFrom<DealDB> for Deal {
    type Error = Error;

    fn try_from(db: DealDB) -> Result<Self, Self::Error> {
        Ok(Deal {
            id: db.id,
            risk_bucket: RiskBucket::from_str(&db.risk_type)?,
            ticker: db.ticker,
            execution_date: parse_date(&db.execution_date)?,
            manager_id: db.manager_id,
            side: TradeSide::from_str(&db.trade_type)?,
            quantity: Decimal::from_str(&db.quantity)?,
            price: Decimal::from_str(&db.buy_price)?,
        })
    }
}
