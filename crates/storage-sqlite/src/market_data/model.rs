//! Database model for daily prices.

use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fund_core::errors::Error;
use fund_core::market_data::PriceObservation;
use fund_core::utils::time_utils::{format_date, parse_date};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub ticker: String,
    pub import_date: String,
    pub price: String,
    pub sector: Option<String>,
}

impl TryFrom<ProductDB> for PriceObservation {
    type Error = Error;

    fn try_from(db: ProductDB) -> Result<Self, Self::Error> {
        Ok(PriceObservation {
            ticker: db.ticker,
            date: parse_date(&db.import_date)?,
            price: Decimal::from_str(&db.price)?,
            sector: db.sector,
        })
    }
}

impl From<&PriceObservation> for ProductDB {
    fn from(obs: &PriceObservation) -> Self {
        ProductDB {
            ticker: obs.ticker.clone(),
            import_date: format_date(obs.date),
            price: obs.price.to_string(),
            sector: obs.sector.clone(),
        }
    }
}
