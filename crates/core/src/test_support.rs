//! In-memory repositories shared by the unit tests.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use fund_market_data::{MarketDataError, PriceBar, PriceProvider};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::constants::CASH_TICKER;
use crate::deals::{Deal, DealRepositoryTrait, NewDeal};
use crate::errors::{DatabaseError, Error, Result};
use crate::managers::{Manager, ManagerRepositoryTrait};
use crate::market_data::{PriceObservation, PriceRepositoryTrait};
use crate::portfolio::history::{PortfolioSnapshot, SnapshotRepositoryTrait};
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};
use crate::strategies::{PositionWrites, RebalancePlan, RebalanceStoreTrait};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct FundState {
    managers: Vec<Manager>,
    positions: BTreeMap<(RiskBucket, String), Position>,
    deals: Vec<Deal>,
    prices: BTreeMap<(String, NaiveDate), PriceObservation>,
    snapshots: Vec<PortfolioSnapshot>,
}

/// A whole fund held in memory, implementing every repository trait.
#[derive(Default)]
pub struct InMemoryFund {
    state: Mutex<FundState>,
    fail_commits: AtomicBool,
}

impl InMemoryFund {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manager(self, bucket: RiskBucket, manager_id: &str) -> Self {
        self.state.lock().unwrap().managers.push(Manager {
            manager_id: manager_id.to_string(),
            risk_bucket: bucket,
            name: format!("Manager {}", manager_id),
        });
        self
    }

    pub fn with_position(
        self,
        bucket: RiskBucket,
        manager_id: &str,
        ticker: &str,
        quantity: Decimal,
        spot_price: Decimal,
    ) -> Self {
        let position = Position {
            risk_bucket: bucket,
            ticker: ticker.to_string(),
            quantity,
            manager_id: manager_id.to_string(),
            last_updated: date(2024, 1, 1),
            spot_price,
        };
        self.state
            .lock()
            .unwrap()
            .positions
            .insert((bucket, ticker.to_string()), position);
        self
    }

    pub fn with_cash(self, bucket: RiskBucket, manager_id: &str, amount: Decimal) -> Self {
        self.with_position(bucket, manager_id, CASH_TICKER, amount, Decimal::ONE)
    }

    /// Records one price per consecutive day, starting at `first`.
    pub fn with_daily_prices(self, ticker: &str, first: NaiveDate, prices: &[Decimal]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for (i, price) in prices.iter().enumerate() {
                let day = first + chrono::Duration::days(i as i64);
                state.prices.insert(
                    (ticker.to_string(), day),
                    PriceObservation::new(ticker, day, *price),
                );
            }
        }
        self
    }

    pub fn with_deal(self, deal: NewDeal) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("deal-{}", state.deals.len() + 1);
            state.deals.push(into_deal(id, deal));
        }
        self
    }

    /// Makes every subsequent `apply_plans` fail without writing.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn positions(&self, bucket: RiskBucket) -> Vec<Position> {
        self.get_positions(bucket).unwrap()
    }

    pub fn position(&self, bucket: RiskBucket, ticker: &str) -> Option<Position> {
        self.get_position(bucket, ticker).unwrap()
    }

    pub fn deals(&self) -> Vec<Deal> {
        self.state.lock().unwrap().deals.clone()
    }

    pub fn snapshots(&self) -> Vec<PortfolioSnapshot> {
        self.state.lock().unwrap().snapshots.clone()
    }

    pub fn price_count(&self) -> usize {
        self.state.lock().unwrap().prices.len()
    }
}

fn into_deal(id: String, deal: NewDeal) -> Deal {
    Deal {
        id,
        risk_bucket: deal.risk_bucket,
        ticker: deal.ticker,
        execution_date: deal.execution_date,
        manager_id: deal.manager_id,
        side: deal.side,
        quantity: deal.quantity,
        price: deal.price,
    }
}

fn apply_writes(state: &mut FundState, bucket: RiskBucket, writes: PositionWrites) {
    match writes {
        PositionWrites::Upsert(positions) => {
            for p in positions {
                state.positions.insert((p.risk_bucket, p.ticker.clone()), p);
            }
        }
        PositionWrites::ReplaceAll(positions) => {
            state.positions.retain(|(b, _), _| *b != bucket);
            for p in positions {
                state.positions.insert((p.risk_bucket, p.ticker.clone()), p);
            }
        }
    }
}

#[async_trait]
impl HoldingsRepositoryTrait for InMemoryFund {
    fn get_positions(&self, bucket: RiskBucket) -> Result<Vec<Position>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .positions
            .values()
            .filter(|p| p.risk_bucket == bucket)
            .cloned()
            .collect())
    }

    fn get_position(&self, bucket: RiskBucket, ticker: &str) -> Result<Option<Position>> {
        let state = self.state.lock().unwrap();
        Ok(state.positions.get(&(bucket, ticker.to_string())).cloned())
    }

    async fn upsert_positions(&self, positions: Vec<Position>) -> Result<usize> {
        let count = positions.len();
        let mut state = self.state.lock().unwrap();
        for p in positions {
            state.positions.insert((p.risk_bucket, p.ticker.clone()), p);
        }
        Ok(count)
    }

    async fn replace_positions(
        &self,
        bucket: RiskBucket,
        positions: Vec<Position>,
    ) -> Result<usize> {
        let count = positions.len();
        let mut state = self.state.lock().unwrap();
        apply_writes(&mut state, bucket, PositionWrites::ReplaceAll(positions));
        Ok(count)
    }
}

#[async_trait]
impl DealRepositoryTrait for InMemoryFund {
    fn get_deals_by_bucket(&self, bucket: RiskBucket) -> Result<Vec<Deal>> {
        let state = self.state.lock().unwrap();
        let mut deals: Vec<Deal> = state
            .deals
            .iter()
            .filter(|d| d.risk_bucket == bucket)
            .cloned()
            .collect();
        deals.sort_by_key(|d| d.execution_date);
        Ok(deals)
    }

    fn count_deals_in_month(&self, bucket: RiskBucket, date: NaiveDate) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .deals
            .iter()
            .filter(|d| {
                d.risk_bucket == bucket
                    && d.execution_date.year() == date.year()
                    && d.execution_date.month() == date.month()
            })
            .count() as i64)
    }

    fn has_deals_on(&self, bucket: RiskBucket, date: NaiveDate) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .deals
            .iter()
            .any(|d| d.risk_bucket == bucket && d.execution_date == date))
    }

    async fn create_deals(&self, deals: Vec<NewDeal>) -> Result<Vec<Deal>> {
        let mut state = self.state.lock().unwrap();
        let mut created = Vec::with_capacity(deals.len());
        for deal in deals {
            let deal = into_deal(format!("deal-{}", state.deals.len() + 1), deal);
            state.deals.push(deal.clone());
            created.push(deal);
        }
        Ok(created)
    }
}

#[async_trait]
impl ManagerRepositoryTrait for InMemoryFund {
    fn get_manager_for_bucket(&self, bucket: RiskBucket) -> Result<Option<Manager>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .managers
            .iter()
            .filter(|m| m.risk_bucket == bucket)
            .min_by(|a, b| a.manager_id.cmp(&b.manager_id))
            .cloned())
    }

    fn list_managers(&self) -> Result<Vec<Manager>> {
        Ok(self.state.lock().unwrap().managers.clone())
    }

    async fn create_manager(&self, manager: Manager) -> Result<Manager> {
        let mut state = self.state.lock().unwrap();
        if state.managers.iter().any(|m| m.manager_id == manager.manager_id) {
            return Err(Error::Database(DatabaseError::UniqueViolation(
                manager.manager_id.clone(),
            )));
        }
        state.managers.push(manager.clone());
        Ok(manager)
    }
}

#[async_trait]
impl PriceRepositoryTrait for InMemoryFund {
    fn get_recent_prices(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<PriceObservation>> {
        let history = self.get_price_history(ticker, as_of)?;
        let skip = history.len().saturating_sub(limit);
        Ok(history.into_iter().skip(skip).collect())
    }

    fn get_price_history(&self, ticker: &str, as_of: NaiveDate) -> Result<Vec<PriceObservation>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .prices
            .values()
            .filter(|p| p.ticker == ticker && p.date <= as_of)
            .cloned()
            .collect())
    }

    fn get_latest_price(&self, ticker: &str, as_of: NaiveDate) -> Result<Option<PriceObservation>> {
        Ok(self.get_price_history(ticker, as_of)?.pop())
    }

    async fn insert_prices(&self, prices: Vec<PriceObservation>) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut inserted = 0;
        for p in prices {
            let key = (p.ticker.clone(), p.date);
            if let std::collections::btree_map::Entry::Vacant(slot) = state.prices.entry(key) {
                slot.insert(p);
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for InMemoryFund {
    fn get_snapshots_by_manager(&self, manager_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.manager_id == manager_id)
            .cloned()
            .collect())
    }

    async fn replace_snapshots_for_managers(
        &self,
        manager_ids: &[String],
        snapshots: Vec<PortfolioSnapshot>,
    ) -> Result<usize> {
        let count = snapshots.len();
        let mut state = self.state.lock().unwrap();
        state.snapshots.retain(|s| !manager_ids.contains(&s.manager_id));
        state.snapshots.extend(snapshots);
        Ok(count)
    }
}

#[async_trait]
impl RebalanceStoreTrait for InMemoryFund {
    async fn apply_plans(&self, plans: Vec<RebalancePlan>) -> Result<usize> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::TransactionFailed(
                "commit refused".to_string(),
            )));
        }
        let mut state = self.state.lock().unwrap();
        let mut written = 0;
        for plan in plans {
            for deal in plan.deals {
                let id = format!("deal-{}", state.deals.len() + 1);
                state.deals.push(into_deal(id, deal));
                written += 1;
            }
            apply_writes(&mut state, plan.bucket, plan.position_writes);
        }
        Ok(written)
    }
}

/// Provider serving canned bars per ticker; unknown tickers are not found.
#[derive(Default)]
pub struct StubPriceProvider {
    bars: HashMap<String, Vec<PriceBar>>,
    failing: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl StubPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_daily_bars(mut self, ticker: &str, first: NaiveDate, closes: &[Decimal]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                PriceBar::new(ticker, first + chrono::Duration::days(i as i64), *close)
            })
            .collect();
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_failure(mut self, ticker: &str, message: &str) -> Self {
        self.failing.insert(ticker.to_string(), message.to_string());
        self
    }
}

#[async_trait]
impl PriceProvider for StubPriceProvider {
    fn id(&self) -> &'static str {
        "STUB"
    }

    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<Vec<PriceBar>, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), start, end));
        if let Some(message) = self.failing.get(ticker) {
            return Err(MarketDataError::ProviderError {
                provider: "STUB".to_string(),
                message: message.clone(),
            });
        }
        self.bars
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(ticker.to_string()))
    }
}
