use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::SnapshotDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::portfolio_history::dsl;
use fund_core::portfolio::history::{PortfolioSnapshot, SnapshotRepositoryTrait};
use fund_core::Result;

pub struct SnapshotRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for SnapshotRepository {
    fn get_snapshots_by_manager(&self, manager_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let mut snapshots = dsl::portfolio_history
            .filter(dsl::manager_id.eq(manager_id))
            .order(dsl::ticker.asc())
            .select(SnapshotDB::as_select())
            .load::<SnapshotDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(PortfolioSnapshot::try_from)
            .collect::<Result<Vec<PortfolioSnapshot>>>()?;
        snapshots.sort_by_key(|s| s.snapshot_date);
        Ok(snapshots)
    }

    async fn replace_snapshots_for_managers(
        &self,
        manager_ids: &[String],
        snapshots: Vec<PortfolioSnapshot>,
    ) -> Result<usize> {
        let manager_ids = manager_ids.to_vec();
        let rows: Vec<SnapshotDB> = snapshots.iter().map(SnapshotDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                for chunk in manager_ids.chunks(500) {
                    diesel::delete(dsl::portfolio_history.filter(dsl::manager_id.eq_any(chunk)))
                        .execute(conn)
                        .into_core()?;
                }
                let mut written = 0;
                for chunk in rows.chunks(500) {
                    written += diesel::insert_into(dsl::portfolio_history)
                        .values(chunk)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(written)
            })
            .await
    }
}
