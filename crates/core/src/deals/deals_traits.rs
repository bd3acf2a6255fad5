//! Repository trait for the deal log.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::deals_model::{Deal, NewDeal};
use crate::errors::Result;
use crate::portfolio::holdings::RiskBucket;

/// Append-only persistence for executed deals.
#[async_trait]
pub trait DealRepositoryTrait: Send + Sync {
    /// All deals of a bucket ordered by execution date, then insertion order.
    fn get_deals_by_bucket(&self, bucket: RiskBucket) -> Result<Vec<Deal>>;

    /// Number of deals in the calendar month containing `date`.
    fn count_deals_in_month(&self, bucket: RiskBucket, date: NaiveDate) -> Result<i64>;

    /// Whether any deal for the bucket was executed on `date`.
    fn has_deals_on(&self, bucket: RiskBucket, date: NaiveDate) -> Result<bool>;

    /// Appends deals to the log.
    async fn create_deals(&self, deals: Vec<NewDeal>) -> Result<Vec<Deal>>;
}
