use async_trait::async_trait;

use super::history_model::PortfolioSnapshot;
use crate::errors::Result;

#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Snapshots of a manager ordered by date, then ticker.
    fn get_snapshots_by_manager(&self, manager_id: &str) -> Result<Vec<PortfolioSnapshot>>;

    /// Deletes every snapshot of `manager_ids` and inserts `snapshots`, atomically.
    async fn replace_snapshots_for_managers(
        &self,
        manager_ids: &[String],
        snapshots: Vec<PortfolioSnapshot>,
    ) -> Result<usize>;
}
