use rust_decimal::Decimal;

use crate::errors::{Result, StrategyError};
use crate::managers::{Manager, ManagerRepositoryTrait};
use crate::portfolio::holdings::{split_cash, HoldingsRepositoryTrait, Position, RiskBucket};

/// Everything a strategy needs to know about its bucket before computing.
#[derive(Debug, Clone)]
pub(crate) struct BucketContext {
    pub manager: Manager,
    pub cash: Decimal,
    pub invested: Vec<Position>,
}

impl BucketContext {
    /// Loads the bucket's manager and positions.
    ///
    /// Fails with a configuration error when the manager or the CASH row is
    /// missing, before anything else is read.
    pub fn load(
        bucket: RiskBucket,
        managers: &dyn ManagerRepositoryTrait,
        holdings: &dyn HoldingsRepositoryTrait,
    ) -> Result<Self> {
        let manager = managers
            .get_manager_for_bucket(bucket)?
            .ok_or(StrategyError::MissingManager(bucket))?;
        let (cash, invested) = split_cash(holdings.get_positions(bucket)?);
        let cash = cash.ok_or(StrategyError::MissingCash(bucket))?;
        Ok(Self {
            manager,
            cash: cash.quantity,
            invested,
        })
    }

    pub fn manager_id(&self) -> &str {
        &self.manager.manager_id
    }
}
