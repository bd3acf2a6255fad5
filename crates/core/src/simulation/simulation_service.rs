//! Weekly replay driver.

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use super::calendar::{advance, SimulationTrigger};
use super::simulation_model::{BucketValuation, SimulationStep, SimulationSummary};
use crate::deals::DealRepositoryTrait;
use crate::errors::{Result, ValidationError};
use crate::market_data::{PriceRefreshService, PriceRepositoryTrait, RefreshReport};
use crate::portfolio::holdings::{split_cash, HoldingsRepositoryTrait, RiskBucket};
use crate::strategies::{
    RebalancePlan, RebalanceStoreTrait, RebalanceStrategy, StrategyOutcome, StrategyStatus,
};
use crate::utils::time_utils::get_days_between;

/// Drives the strategies over a calendar range, one Monday at a time.
///
/// Every Monday's plans are committed together. A Monday at or before the
/// last processed one is never run again, and a bucket that already has
/// deals dated on the Monday is reported as `AlreadyApplied`.
pub struct SimulationService {
    tickers: Vec<String>,
    strategies: Vec<Arc<dyn RebalanceStrategy>>,
    refresh_service: Option<Arc<PriceRefreshService>>,
    store: Arc<dyn RebalanceStoreTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    deal_repository: Arc<dyn DealRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
    last_processed: RwLock<Option<NaiveDate>>,
}

impl SimulationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tickers: Vec<String>,
        strategies: Vec<Arc<dyn RebalanceStrategy>>,
        refresh_service: Option<Arc<PriceRefreshService>>,
        store: Arc<dyn RebalanceStoreTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        deal_repository: Arc<dyn DealRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            tickers,
            strategies,
            refresh_service,
            store,
            holdings_repository,
            deal_repository,
            price_repository,
            last_processed: RwLock::new(None),
        }
    }

    pub fn last_processed(&self) -> Option<NaiveDate> {
        self.last_processed.read().ok().and_then(|guard| *guard)
    }

    /// Runs every day of `[start, end]` and reports the processed Mondays.
    pub async fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<SimulationSummary> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "Simulation start {} is after end {}",
                start, end
            ))
            .into());
        }
        info!("Simulating {} to {}", start, end);

        let mut summary = SimulationSummary {
            start,
            end,
            mondays_processed: 0,
            first_monday: None,
            last_monday: None,
            steps: Vec::new(),
        };

        for day in get_days_between(start, end) {
            let mut refresh = None;
            for trigger in advance(day) {
                match trigger {
                    SimulationTrigger::RefreshPrices { start, end } => {
                        if self.is_processed(day) {
                            continue;
                        }
                        refresh = self.refresh(start, end).await;
                    }
                    SimulationTrigger::RunStrategies { date } => {
                        if self.is_processed(date) {
                            warn!("Skipping {}: already processed", date);
                            continue;
                        }
                        let step = self.run_step(date, refresh.take()).await;
                        summary.mondays_processed += 1;
                        summary.first_monday.get_or_insert(date);
                        summary.last_monday = Some(date);
                        summary.steps.push(step);
                    }
                }
            }
        }

        info!(
            "Simulation complete: {} Mondays processed between {} and {}, {} deals",
            summary.mondays_processed,
            start,
            end,
            summary.total_deals()
        );
        Ok(summary)
    }

    fn is_processed(&self, date: NaiveDate) -> bool {
        self.last_processed().is_some_and(|last| date <= last)
    }

    async fn refresh(&self, start: NaiveDate, end: NaiveDate) -> Option<RefreshReport> {
        let service = self.refresh_service.as_ref()?;
        Some(service.refresh(&self.tickers, start, end).await)
    }

    /// Plans every bucket, commits the plans in one transaction, then values the buckets.
    pub async fn run_step(
        &self,
        date: NaiveDate,
        refresh: Option<RefreshReport>,
    ) -> SimulationStep {
        let mut outcomes = Vec::with_capacity(self.strategies.len());
        let mut plans: Vec<RebalancePlan> = Vec::new();

        for strategy in &self.strategies {
            let outcome = self.plan_bucket(strategy.as_ref(), date);
            if let Some(plan) = outcome.plan.as_ref().filter(|p| !p.is_empty()) {
                match plan.validate() {
                    Ok(()) => plans.push(plan.clone()),
                    Err(e) => {
                        let bucket = strategy.bucket();
                        error!("Discarding invalid {} plan on {}: {}", bucket, date, e);
                        outcomes.push(StrategyOutcome::rejected(bucket, date, e.to_string()));
                        continue;
                    }
                }
            }
            info!(
                "{} on {}: {:?} with {} deals",
                strategy.bucket(),
                date,
                outcome.status,
                outcome.deal_count()
            );
            outcomes.push(outcome);
        }

        let (committed, deals_written) = if plans.is_empty() {
            (true, 0)
        } else {
            match self.store.apply_plans(plans).await {
                Ok(written) => (true, written),
                Err(e) => {
                    error!("Rolled back simulation step {}: {}", date, e);
                    (false, 0)
                }
            }
        };

        let valuations = self
            .strategies
            .iter()
            .filter_map(|s| match self.value_bucket(s.bucket(), date) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Could not value {} on {}: {}", s.bucket(), date, e);
                    None
                }
            })
            .collect();

        if let Ok(mut last) = self.last_processed.write() {
            *last = Some(date);
        }

        SimulationStep {
            date,
            refresh,
            outcomes,
            committed,
            deals_written,
            valuations,
        }
    }

    fn plan_bucket(&self, strategy: &dyn RebalanceStrategy, date: NaiveDate) -> StrategyOutcome {
        let bucket = strategy.bucket();
        match self.deal_repository.has_deals_on(bucket, date) {
            Ok(true) => {
                debug!("{} already has deals on {}", bucket, date);
                return StrategyOutcome::without_plan(
                    bucket,
                    date,
                    StrategyStatus::AlreadyApplied,
                );
            }
            Ok(false) => {}
            Err(e) => {
                error!("Could not check existing deals for {} on {}: {}", bucket, date, e);
                return StrategyOutcome::rejected(bucket, date, e.to_string());
            }
        }

        match strategy.plan(date) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "{} strategy failed for {} on {}: {}",
                    strategy.name(),
                    bucket,
                    date,
                    e
                );
                StrategyOutcome::rejected(bucket, date, e.to_string())
            }
        }
    }

    /// Invested value at the latest known prices plus cash.
    ///
    /// Falls back to the stored spot price for tickers without a price.
    pub fn value_bucket(&self, bucket: RiskBucket, date: NaiveDate) -> Result<BucketValuation> {
        let (cash, invested) = split_cash(self.holdings_repository.get_positions(bucket)?);
        let mut invested_value = Decimal::ZERO;
        for position in invested {
            let price = self
                .price_repository
                .get_latest_price(&position.ticker, date)?
                .filter(|p| p.is_tradable())
                .map(|p| p.price)
                .unwrap_or(position.spot_price);
            invested_value += position.quantity * price;
        }
        Ok(BucketValuation {
            bucket,
            date,
            invested_value,
            cash: cash.map(|c| c.quantity).unwrap_or_default(),
        })
    }
}
