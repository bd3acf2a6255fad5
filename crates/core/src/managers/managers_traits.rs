use async_trait::async_trait;

use super::managers_model::Manager;
use crate::errors::Result;
use crate::portfolio::holdings::RiskBucket;

#[async_trait]
pub trait ManagerRepositoryTrait: Send + Sync {
    /// The manager assigned to a bucket. When several exist the lowest id wins.
    fn get_manager_for_bucket(&self, bucket: RiskBucket) -> Result<Option<Manager>>;

    fn list_managers(&self) -> Result<Vec<Manager>>;

    async fn create_manager(&self, manager: Manager) -> Result<Manager>;
}
