//! Repository trait for the holdings store.

use async_trait::async_trait;

use super::holdings_model::{Position, RiskBucket};
use crate::errors::Result;

/// Persistence contract for current bucket positions.
///
/// Positions are unique per `(risk_bucket, ticker)`; writes never append a
/// second row for an existing key.
#[async_trait]
pub trait HoldingsRepositoryTrait: Send + Sync {
    /// All positions of a bucket, CASH included, ordered by ticker.
    fn get_positions(&self, bucket: RiskBucket) -> Result<Vec<Position>>;

    /// A single position, if the bucket holds the ticker.
    fn get_position(&self, bucket: RiskBucket, ticker: &str) -> Result<Option<Position>>;

    /// Inserts or updates each position by its `(risk_bucket, ticker)` key.
    async fn upsert_positions(&self, positions: Vec<Position>) -> Result<usize>;

    /// Deletes every position of `bucket` and inserts `positions` in one transaction.
    async fn replace_positions(&self, bucket: RiskBucket, positions: Vec<Position>)
        -> Result<usize>;
}
