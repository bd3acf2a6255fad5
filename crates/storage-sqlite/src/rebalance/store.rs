use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use log::debug;

use crate::db::WriteHandle;
use crate::deals::insert_deals;
use crate::holdings::apply_position_writes;
use fund_core::strategies::{RebalancePlan, RebalanceStoreTrait};
use fund_core::Result;

/// Writes every plan of a step in one writer job, hence one transaction.
pub struct RebalanceStore {
    writer: WriteHandle,
}

impl RebalanceStore {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl RebalanceStoreTrait for RebalanceStore {
    async fn apply_plans(&self, plans: Vec<RebalancePlan>) -> Result<usize> {
        for plan in &plans {
            plan.validate()?;
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for plan in &plans {
                    written += insert_deals(conn, &plan.deals)?.len();
                    let positions =
                        apply_position_writes(conn, plan.bucket, &plan.position_writes)?;
                    debug!(
                        "Committed {} plan for {}: {} deals, {} positions",
                        plan.bucket,
                        plan.date,
                        plan.deals.len(),
                        positions
                    );
                }
                Ok(written)
            })
            .await
    }
}
