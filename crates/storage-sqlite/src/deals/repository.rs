use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::DealDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::deals::dsl;
use fund_core::deals::{Deal, DealRepositoryTrait, NewDeal};
use fund_core::portfolio::holdings::RiskBucket;
use fund_core::utils::time_utils::month_bounds;
use fund_core::Result;

pub struct DealRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DealRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Appends deals on an open transaction and returns the stored rows.
pub(crate) fn insert_deals(conn: &mut SqliteConnection, deals: &[NewDeal]) -> Result<Vec<Deal>> {
    let rows: Vec<DealDB> = deals.iter().map(DealDB::from_new).collect();
    for chunk in rows.chunks(500) {
        diesel::insert_into(dsl::deals)
            .values(chunk)
            .execute(conn)
            .into_core()?;
    }
    rows.into_iter().map(Deal::try_from).collect()
}

#[async_trait]
impl DealRepositoryTrait for DealRepository {
    fn get_deals_by_bucket(&self, bucket: RiskBucket) -> Result<Vec<Deal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut deals = dsl::deals
            .filter(dsl::risk_type.eq(bucket.as_str()))
            .order(dsl::id.asc())
            .select(DealDB::as_select())
            .load::<DealDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Deal::try_from)
            .collect::<Result<Vec<Deal>>>()?;
        // Stored dates may be day-first, so order on the parsed value.
        deals.sort_by_key(|d| d.execution_date);
        Ok(deals)
    }

    fn count_deals_in_month(&self, bucket: RiskBucket, date: NaiveDate) -> Result<i64> {
        let (first, last) = month_bounds(date);
        let in_month = self
            .get_deals_by_bucket(bucket)?
            .into_iter()
            .filter(|d| (first..=last).contains(&d.execution_date))
            .count();
        Ok(in_month as i64)
    }

    fn has_deals_on(&self, bucket: RiskBucket, date: NaiveDate) -> Result<bool> {
        Ok(self
            .get_deals_by_bucket(bucket)?
            .iter()
            .any(|d| d.execution_date == date))
    }

    async fn create_deals(&self, deals: Vec<NewDeal>) -> Result<Vec<Deal>> {
        if deals.is_empty() {
            return Ok(Vec::new());
        }
        for deal in &deals {
            deal.validate()?;
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| insert_deals(conn, &deals))
            .await
    }
}
