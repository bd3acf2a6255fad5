use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::ProductDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::products::dsl;
use fund_core::market_data::{PriceObservation, PriceRepositoryTrait};
use fund_core::Result;

pub struct PriceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PriceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Rows of `ticker` dated on or before `as_of`, oldest first.
///
/// Dates are compared after parsing so day-first legacy rows sort with the rest.
fn load_history(
    conn: &mut SqliteConnection,
    ticker: &str,
    as_of: NaiveDate,
) -> Result<Vec<PriceObservation>> {
    let rows = dsl::products
        .filter(dsl::ticker.eq(ticker))
        .select(ProductDB::as_select())
        .load::<ProductDB>(conn)
        .into_core()?;

    let mut history = Vec::with_capacity(rows.len());
    for row in rows {
        let observation = PriceObservation::try_from(row)?;
        if observation.date <= as_of {
            history.push(observation);
        }
    }
    history.sort_by_key(|o| o.date);
    Ok(history)
}

#[async_trait]
impl PriceRepositoryTrait for PriceRepository {
    fn get_recent_prices(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        let mut history = load_history(&mut conn, ticker, as_of)?;
        let skip = history.len().saturating_sub(limit);
        Ok(history.split_off(skip))
    }

    fn get_price_history(&self, ticker: &str, as_of: NaiveDate) -> Result<Vec<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        load_history(&mut conn, ticker, as_of)
    }

    fn get_latest_price(&self, ticker: &str, as_of: NaiveDate) -> Result<Option<PriceObservation>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(load_history(&mut conn, ticker, as_of)?.pop())
    }

    async fn insert_prices(&self, prices: Vec<PriceObservation>) -> Result<usize> {
        if prices.is_empty() {
            return Ok(0);
        }
        let rows: Vec<ProductDB> = prices.iter().map(ProductDB::from).collect();
        let offered = rows.len();

        let inserted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut inserted = 0;
                for chunk in rows.chunks(500) {
                    inserted += diesel::insert_or_ignore_into(dsl::products)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(inserted)
            })
            .await?;
        if inserted < offered {
            debug!("Ignored {} already stored prices", offered - inserted);
        }
        Ok(inserted)
    }
}
