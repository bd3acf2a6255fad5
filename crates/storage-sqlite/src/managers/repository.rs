use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::ManagerDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::managers::dsl;
use fund_core::managers::{Manager, ManagerRepositoryTrait};
use fund_core::portfolio::holdings::RiskBucket;
use fund_core::Result;

pub struct ManagerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ManagerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ManagerRepositoryTrait for ManagerRepository {
    fn get_manager_for_bucket(&self, bucket: RiskBucket) -> Result<Option<Manager>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::managers
            .filter(dsl::risk_type.eq(bucket.as_str()))
            .order(dsl::manager_id.asc())
            .select(ManagerDB::as_select())
            .first::<ManagerDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Manager::try_from)
            .transpose()
    }

    fn list_managers(&self) -> Result<Vec<Manager>> {
        let mut conn = get_connection(&self.pool)?;
        dsl::managers
            .order(dsl::manager_id.asc())
            .select(ManagerDB::as_select())
            .load::<ManagerDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Manager::try_from)
            .collect()
    }

    async fn create_manager(&self, manager: Manager) -> Result<Manager> {
        manager.validate()?;
        let row = ManagerDB::from(&manager);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(dsl::managers)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await?;
        Ok(manager)
    }
}
