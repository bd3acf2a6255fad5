use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::PositionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::portfolios::dsl;
use fund_core::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};
use fund_core::strategies::PositionWrites;
use fund_core::Result;

pub struct HoldingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HoldingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Inserts or replaces each row by its `(risk_type, ticker)` key.
pub(crate) fn upsert_rows(conn: &mut SqliteConnection, positions: &[Position]) -> Result<usize> {
    let rows: Vec<PositionDB> = positions.iter().map(PositionDB::from).collect();
    let mut written = 0;
    for chunk in rows.chunks(500) {
        written += diesel::replace_into(dsl::portfolios)
            .values(chunk)
            .execute(conn)
            .into_core()?;
    }
    Ok(written)
}

/// Applies a plan's position writes on an open transaction.
pub(crate) fn apply_position_writes(
    conn: &mut SqliteConnection,
    bucket: RiskBucket,
    writes: &PositionWrites,
) -> Result<usize> {
    match writes {
        PositionWrites::Upsert(positions) => upsert_rows(conn, positions),
        PositionWrites::ReplaceAll(positions) => {
            diesel::delete(dsl::portfolios.filter(dsl::risk_type.eq(bucket.as_str())))
                .execute(conn)
                .into_core()?;
            upsert_rows(conn, positions)
        }
    }
}

#[async_trait]
impl HoldingsRepositoryTrait for HoldingsRepository {
    fn get_positions(&self, bucket: RiskBucket) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::portfolios
            .filter(dsl::risk_type.eq(bucket.as_str()))
            .order(dsl::ticker.asc())
            .select(PositionDB::as_select())
            .load::<PositionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    fn get_position(&self, bucket: RiskBucket, ticker: &str) -> Result<Option<Position>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::portfolios
            .filter(dsl::risk_type.eq(bucket.as_str()))
            .filter(dsl::ticker.eq(ticker))
            .select(PositionDB::as_select())
            .first::<PositionDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Position::try_from)
            .transpose()
    }

    async fn upsert_positions(&self, positions: Vec<Position>) -> Result<usize> {
        if positions.is_empty() {
            return Ok(0);
        }
        for position in &positions {
            position.validate()?;
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| upsert_rows(conn, &positions))
            .await
    }

    async fn replace_positions(
        &self,
        bucket: RiskBucket,
        positions: Vec<Position>,
    ) -> Result<usize> {
        for position in &positions {
            position.validate()?;
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                apply_position_writes(conn, bucket, &PositionWrites::ReplaceAll(positions))
            })
            .await
    }
}
