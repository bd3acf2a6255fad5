use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;

use super::strategy_model::{RebalancePlan, StrategyOutcome};
use crate::errors::{Error, Result};
use crate::portfolio::holdings::RiskBucket;

/// A per-bucket rebalancing rule.
///
/// Implementations only read through repository traits; the resulting plan
/// is committed by the caller.
pub trait RebalanceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn bucket(&self) -> RiskBucket;

    fn plan(&self, date: NaiveDate) -> Result<StrategyOutcome>;
}

/// Atomic commit of rebalance plans.
#[async_trait]
pub trait RebalanceStoreTrait: Send + Sync {
    /// Appends every plan's deals and applies its position writes in a single
    /// transaction. Returns the number of deals written.
    async fn apply_plans(&self, plans: Vec<RebalancePlan>) -> Result<usize>;
}

/// Turns configuration failures into a `Rejected` outcome.
pub(crate) fn reject_on_configuration(
    bucket: RiskBucket,
    date: NaiveDate,
    result: Result<StrategyOutcome>,
) -> Result<StrategyOutcome> {
    match result {
        Err(Error::Strategy(e)) if e.is_configuration() => {
            warn!("Skipping {} on {}: {}", bucket, date, e);
            Ok(StrategyOutcome::rejected(bucket, date, e.to_string()))
        }
        other => other,
    }
}
