//! Contrarian breakout signal for the low-turnover bucket.

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::bucket_context::BucketContext;
use super::strategy_model::{PositionWrites, RebalancePlan, StrategyOutcome, StrategyStatus};
use super::strategy_settings::BreakoutSettings;
use super::strategy_traits::{reject_on_configuration, RebalanceStrategy};
use crate::deals::{DealRepositoryTrait, NewDeal, TradeSide};
use crate::errors::Result;
use crate::managers::ManagerRepositoryTrait;
use crate::market_data::PriceRepositoryTrait;
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};

/// Price statistics of one tracked ticker over the breakout window.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutStats {
    pub ticker: String,
    pub latest: Decimal,
    pub moving_average: Decimal,
    pub range_high: Decimal,
    pub range_low: Decimal,
    pub period_return: Decimal,
}

impl BreakoutStats {
    /// Computes the statistics from prices ordered oldest first.
    ///
    /// `None` when fewer than `window` prices exist, the range does not fit in
    /// the window, or the first price is not positive.
    pub fn from_prices(
        ticker: &str,
        prices: &[Decimal],
        window: usize,
        range: usize,
    ) -> Option<Self> {
        if window == 0 || range == 0 || range >= window || prices.len() < window {
            return None;
        }
        let prices = &prices[prices.len() - window..];
        let first = prices[0];
        let latest = prices[window - 1];
        if first <= Decimal::ZERO {
            return None;
        }

        let before_latest = &prices[window - 1 - range..window - 1];
        let range_high = before_latest.iter().copied().max()?;
        let range_low = before_latest.iter().copied().min()?;
        let moving_average = prices.iter().copied().sum::<Decimal>() / Decimal::from(window);

        Some(Self {
            ticker: ticker.to_string(),
            latest,
            moving_average,
            range_high,
            range_low,
            period_return: (latest - first) / first,
        })
    }

    pub fn is_downside_breakout(&self) -> bool {
        self.latest < self.range_low && self.latest < self.moving_average
    }

    pub fn is_upside_breakout(&self) -> bool {
        self.latest > self.range_high && self.latest > self.moving_average
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutDecision {
    pub ticker: String,
    pub side: TradeSide,
    pub price: Decimal,
}

/// Selects at most `remaining` unit decisions from the stats, in ticker order.
///
/// Breakouts come first; if fewer than two fired and two cap units are still
/// free, the worst performer is bought (when affordable) and the best sold.
pub fn decide(
    stats: &[BreakoutStats],
    mut cash: Decimal,
    mut remaining: i64,
    holdings: Option<&BTreeMap<String, Decimal>>,
) -> Vec<BreakoutDecision> {
    let mut decisions = Vec::new();
    let can_sell = |ticker: &str, decisions: &[BreakoutDecision]| match holdings {
        None => true,
        Some(held) => {
            let pending = decisions
                .iter()
                .filter(|d| d.ticker == ticker)
                .map(|d| d.side.signed(Decimal::ONE))
                .sum::<Decimal>();
            held.get(ticker).copied().unwrap_or_default() + pending >= Decimal::ONE
        }
    };

    for s in stats {
        if remaining <= 0 {
            break;
        }
        if s.is_downside_breakout() && cash >= s.latest {
            cash -= s.latest;
            remaining -= 1;
            decisions.push(BreakoutDecision {
                ticker: s.ticker.clone(),
                side: TradeSide::Buy,
                price: s.latest,
            });
        } else if s.is_upside_breakout() && can_sell(&s.ticker, &decisions) {
            cash += s.latest;
            remaining -= 1;
            decisions.push(BreakoutDecision {
                ticker: s.ticker.clone(),
                side: TradeSide::Sell,
                price: s.latest,
            });
        }
    }

    if decisions.len() < 2 && remaining >= 2 && stats.len() >= 2 {
        let mut ranked: Vec<&BreakoutStats> = stats.iter().collect();
        ranked.sort_by(|a, b| {
            a.period_return
                .cmp(&b.period_return)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        let worst = ranked[0];
        let best = ranked[ranked.len() - 1];

        if cash >= worst.latest {
            decisions.push(BreakoutDecision {
                ticker: worst.ticker.clone(),
                side: TradeSide::Buy,
                price: worst.latest,
            });
        }
        if can_sell(&best.ticker, &decisions) {
            decisions.push(BreakoutDecision {
                ticker: best.ticker.clone(),
                side: TradeSide::Sell,
                price: best.latest,
            });
        }
    }

    decisions
}

pub struct BreakoutStrategy {
    settings: BreakoutSettings,
    manager_repository: Arc<dyn ManagerRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    deal_repository: Arc<dyn DealRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl BreakoutStrategy {
    pub fn new(
        settings: BreakoutSettings,
        manager_repository: Arc<dyn ManagerRepositoryTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        deal_repository: Arc<dyn DealRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            settings,
            manager_repository,
            holdings_repository,
            deal_repository,
            price_repository,
        }
    }

    fn load_stats(&self, date: NaiveDate) -> Result<Vec<BreakoutStats>> {
        let mut tickers = self.settings.tickers.clone();
        tickers.sort();
        tickers.dedup();

        let mut stats = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            let prices: Vec<Decimal> = self
                .price_repository
                .get_recent_prices(ticker, date, self.settings.window)?
                .into_iter()
                .map(|p| p.price)
                .collect();
            let window = self.settings.window;
            match BreakoutStats::from_prices(ticker, &prices, window, self.settings.range) {
                Some(s) => stats.push(s),
                None => debug!(
                    "Breakout skips {}: {} of {} observations",
                    ticker,
                    prices.len(),
                    self.settings.window
                ),
            }
        }
        Ok(stats)
    }

    fn build_plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        let bucket = self.bucket();
        let ctx = BucketContext::load(
            bucket,
            self.manager_repository.as_ref(),
            self.holdings_repository.as_ref(),
        )?;

        let executed = self.deal_repository.count_deals_in_month(bucket, date)?;
        if executed >= self.settings.monthly_cap {
            info!(
                "Breakout cap reached for {}: {} deals this month",
                bucket, executed
            );
            return Ok(StrategyOutcome::without_plan(
                bucket,
                date,
                StrategyStatus::CapReached,
            ));
        }

        let stats = self.load_stats(date)?;
        let held: BTreeMap<String, Decimal> = ctx
            .invested
            .iter()
            .map(|p| (p.ticker.clone(), p.quantity))
            .collect();
        let decisions = decide(
            &stats,
            ctx.cash,
            self.settings.monthly_cap - executed,
            self.settings.updates_holdings.then_some(&held),
        );
        if decisions.is_empty() {
            return Ok(StrategyOutcome::unchanged(bucket, date));
        }

        let manager_id = ctx.manager_id().to_string();
        let deals: Vec<NewDeal> = decisions
            .iter()
            .map(|d| NewDeal {
                risk_bucket: bucket,
                ticker: d.ticker.clone(),
                execution_date: date,
                manager_id: manager_id.clone(),
                side: d.side,
                quantity: Decimal::ONE,
                price: d.price,
            })
            .collect();

        let positions = if self.settings.updates_holdings {
            apply_decisions(bucket, &manager_id, date, &ctx, &decisions)
        } else {
            Vec::new()
        };

        Ok(StrategyOutcome::rebalanced(RebalancePlan {
            bucket,
            date,
            deals,
            position_writes: PositionWrites::Upsert(positions),
        }))
    }
}

/// Position rows after applying unit decisions, CASH last.
fn apply_decisions(
    bucket: RiskBucket,
    manager_id: &str,
    date: NaiveDate,
    ctx: &BucketContext,
    decisions: &[BreakoutDecision],
) -> Vec<Position> {
    let mut touched: BTreeMap<String, Position> = BTreeMap::new();
    let mut cash = ctx.cash;
    for decision in decisions {
        let position = touched.entry(decision.ticker.clone()).or_insert_with(|| {
            ctx.invested
                .iter()
                .find(|p| p.ticker == decision.ticker)
                .cloned()
                .unwrap_or(Position {
                    risk_bucket: bucket,
                    ticker: decision.ticker.clone(),
                    quantity: Decimal::ZERO,
                    manager_id: manager_id.to_string(),
                    last_updated: date,
                    spot_price: decision.price,
                })
        });
        position.quantity += decision.side.signed(Decimal::ONE);
        position.spot_price = decision.price;
        position.last_updated = date;
        cash -= decision.side.signed(Decimal::ONE) * decision.price;
    }

    let mut positions: Vec<Position> = touched.into_values().collect();
    positions.push(Position::cash(bucket, manager_id, cash, date));
    positions
}

impl RebalanceStrategy for BreakoutStrategy {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn bucket(&self) -> RiskBucket {
        RiskBucket::LowTurnover
    }

    fn plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        reject_on_configuration(self.bucket(), date, self.build_plan(date))
    }
}
