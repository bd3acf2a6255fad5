use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fund_core::errors::Error;
use fund_core::portfolio::history::PortfolioSnapshot;
use fund_core::utils::time_utils::{format_date, parse_date};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::portfolio_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotDB {
    pub manager_id: String,
    pub ticker: String,
    pub quantity: String,
    pub date_snapshot: String,
}

impl TryFrom<SnapshotDB> for PortfolioSnapshot {
    type Error = Error;

    fn try_from(db: SnapshotDB) -> Result<Self, Self::Error> {
        Ok(PortfolioSnapshot {
            manager_id: db.manager_id,
            ticker: db.ticker,
            quantity: Decimal::from_str(&db.quantity)?,
            snapshot_date: parse_date(&db.date_snapshot)?,
        })
    }
}

impl From<&PortfolioSnapshot> for SnapshotDB {
    fn from(snapshot: &PortfolioSnapshot) -> Self {
        SnapshotDB {
            manager_id: snapshot.manager_id.clone(),
            ticker: snapshot.ticker.clone(),
            quantity: snapshot.quantity.to_string(),
            date_snapshot: format_date(snapshot.snapshot_date),
        }
    }
}
