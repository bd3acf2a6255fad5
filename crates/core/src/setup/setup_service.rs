use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::CASH_TICKER;
use crate::deals::{NewDeal, TradeSide};
use crate::errors::{Result, ValidationError};
use crate::managers::{Manager, ManagerRepositoryTrait};
use crate::market_data::PriceRepositoryTrait;
use crate::portfolio::holdings::{split_cash, HoldingsRepositoryTrait, Position, RiskBucket};
use crate::strategies::{PositionWrites, RebalancePlan, RebalanceStoreTrait};

/// What `ensure_bucket` had to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSetup {
    pub manager_created: bool,
    pub cash_created: bool,
    pub tickers_added: Vec<String>,
}

impl BucketSetup {
    pub fn is_noop(&self) -> bool {
        !self.manager_created && !self.cash_created && self.tickers_added.is_empty()
    }
}

pub struct FundSetupService {
    manager_repository: Arc<dyn ManagerRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    store: Arc<dyn RebalanceStoreTrait>,
}

impl FundSetupService {
    pub fn new(
        manager_repository: Arc<dyn ManagerRepositoryTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
        store: Arc<dyn RebalanceStoreTrait>,
    ) -> Self {
        Self {
            manager_repository,
            holdings_repository,
            price_repository,
            store,
        }
    }

    /// Makes sure `bucket` can be traded.
    ///
    /// Creates the manager when the bucket has none, the CASH row when it is
    /// missing, and a zero-quantity row for every universe ticker not yet held.
    /// Existing rows, CASH included, are never touched.
    pub async fn ensure_bucket(
        &self,
        bucket: RiskBucket,
        manager_id: &str,
        initial_cash: Decimal,
        universe: &[String],
        as_of: NaiveDate,
    ) -> Result<BucketSetup> {
        if initial_cash < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Initial cash for {} must not be negative",
                bucket
            ))
            .into());
        }

        let mut setup = BucketSetup::default();
        let manager = match self.manager_repository.get_manager_for_bucket(bucket)? {
            Some(existing) => existing,
            None => {
                let manager = Manager {
                    manager_id: manager_id.to_string(),
                    risk_bucket: bucket,
                    name: format!("{} manager", bucket),
                };
                manager.validate()?;
                setup.manager_created = true;
                self.manager_repository.create_manager(manager).await?
            }
        };

        let mut new_rows = Vec::new();
        if self.holdings_repository.get_position(bucket, CASH_TICKER)?.is_none() {
            setup.cash_created = true;
            new_rows.push(Position::cash(bucket, &manager.manager_id, initial_cash, as_of));
        }

        for ticker in universe {
            let ticker = ticker.trim().to_uppercase();
            if ticker.is_empty() || setup.tickers_added.contains(&ticker) {
                continue;
            }
            if self.holdings_repository.get_position(bucket, &ticker)?.is_some() {
                debug!("{} already holds {}", bucket, ticker);
                continue;
            }
            new_rows.push(Position {
                risk_bucket: bucket,
                ticker: ticker.clone(),
                quantity: Decimal::ZERO,
                manager_id: manager.manager_id.clone(),
                last_updated: as_of,
                spot_price: Decimal::ZERO,
            });
            setup.tickers_added.push(ticker);
        }

        if !new_rows.is_empty() {
            self.holdings_repository.upsert_positions(new_rows).await?;
        }
        if !setup.is_noop() {
            info!(
                "Seeded {} for manager {}: manager created {}, cash created {}, {} tickers added",
                bucket,
                manager.manager_id,
                setup.manager_created,
                setup.cash_created,
                setup.tickers_added.len()
            );
        }
        Ok(setup)
    }

    /// Spends `bucket`'s cash equally across its universe rows at the latest
    /// prices on or before `as_of`, buying whole units recorded as deals.
    ///
    /// Does nothing once the bucket holds any ticker. Tickers without a price
    /// are left out of the split. Returns the number of deals written.
    pub async fn seed_allocation(&self, bucket: RiskBucket, as_of: NaiveDate) -> Result<usize> {
        let positions = self.holdings_repository.get_positions(bucket)?;
        let (cash, invested) = split_cash(positions);
        let Some(cash) = cash else {
            return Err(ValidationError::InvalidInput(format!(
                "{} has no CASH row to allocate from",
                bucket
            ))
            .into());
        };
        if invested.iter().any(|p| p.quantity > Decimal::ZERO) {
            debug!("{} already holds positions, skipping initial allocation", bucket);
            return Ok(0);
        }

        let mut priced = Vec::new();
        for position in invested {
            match self.price_repository.get_latest_price(&position.ticker, as_of)? {
                Some(obs) if obs.is_tradable() => priced.push((position, obs.price)),
                _ => warn!(
                    "No price for {} on {}, left out of {}",
                    position.ticker, as_of, bucket
                ),
            }
        }
        if priced.is_empty() || cash.quantity <= Decimal::ZERO {
            warn!("Nothing to allocate for {} on {}", bucket, as_of);
            return Ok(0);
        }

        let slice = cash.quantity / Decimal::from(priced.len());
        let mut remaining = cash.quantity;
        let mut deals = Vec::new();
        let mut writes = Vec::new();
        for (position, price) in priced {
            let quantity = (slice / price).round_dp_with_strategy(0, RoundingStrategy::ToZero);
            if quantity <= Decimal::ZERO {
                debug!("{} at {} does not fit a slice of {}", position.ticker, price, slice);
                continue;
            }
            remaining -= quantity * price;
            deals.push(NewDeal {
                risk_bucket: bucket,
                ticker: position.ticker.clone(),
                execution_date: as_of,
                manager_id: position.manager_id.clone(),
                side: TradeSide::Buy,
                quantity,
                price,
            });
            writes.push(Position {
                quantity,
                last_updated: as_of,
                spot_price: price,
                ..position.clone()
            });
        }
        if deals.is_empty() {
            warn!("Cash of {} buys no whole unit in {}", cash.quantity, bucket);
            return Ok(0);
        }
        writes.push(Position {
            quantity: remaining,
            last_updated: as_of,
            ..cash.clone()
        });

        let plan = RebalancePlan {
            bucket,
            date: as_of,
            deals,
            position_writes: PositionWrites::Upsert(writes),
        };
        plan.validate()?;
        let written = self.store.apply_plans(vec![plan]).await?;
        info!(
            "Allocated {} of {} cash across {} tickers on {}",
            cash.quantity - remaining,
            bucket,
            written,
            as_of
        );
        Ok(written)
    }
}
