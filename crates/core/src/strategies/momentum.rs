//! Momentum rebalance for the high-yield equity bucket.
//!
//! Each held ticker is scaled by its weekly return: a ticker that rose 10%
//! gets 10% more shares, one that fell gets trimmed. Larger moves are executed
//! first against a shared cash balance; buys are clipped to what the cash
//! still covers.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use super::bucket_context::BucketContext;
use super::strategy_model::{PositionWrites, RebalancePlan, StrategyOutcome};
use super::strategy_settings::MomentumSettings;
use super::strategy_traits::{reject_on_configuration, RebalanceStrategy};
use crate::deals::{NewDeal, TradeSide};
use crate::errors::Result;
use crate::managers::ManagerRepositoryTrait;
use crate::market_data::PriceRepositoryTrait;
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};

/// Weekly move of one held ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumSignal {
    pub ticker: String,
    pub held: Decimal,
    pub latest_price: Decimal,
    pub weekly_return: Decimal,
}

impl MomentumSignal {
    /// Desired quantity change, rounded half to even.
    pub fn desired_delta(&self) -> Decimal {
        (self.held * self.weekly_return)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumTrade {
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub new_quantity: Decimal,
}

/// Walks the signals largest move first, debiting and crediting `cash`.
///
/// Returns the executed trades and the remaining cash, which is never
/// negative when `cash` starts non-negative.
pub fn allocate(cash: Decimal, mut signals: Vec<MomentumSignal>) -> (Vec<MomentumTrade>, Decimal) {
    signals.sort_by(|a, b| {
        b.weekly_return
            .abs()
            .cmp(&a.weekly_return.abs())
            .then_with(|| a.ticker.cmp(&b.ticker))
    });

    let mut cash = cash;
    let mut trades = Vec::new();
    for signal in signals {
        let delta = signal.desired_delta();
        let price = signal.latest_price;
        let Some(side) = TradeSide::from_delta(delta) else {
            continue;
        };
        if price <= Decimal::ZERO {
            continue;
        }

        let quantity = match side {
            TradeSide::Buy => {
                let affordable = (cash / price).floor();
                delta.min(affordable)
            }
            TradeSide::Sell => delta.abs().min(signal.held),
        };
        if quantity <= Decimal::ZERO {
            debug!("Momentum skips {}: nothing executable", signal.ticker);
            continue;
        }

        match side {
            TradeSide::Buy => cash -= quantity * price,
            TradeSide::Sell => cash += quantity * price,
        }
        trades.push(MomentumTrade {
            new_quantity: signal.held + side.signed(quantity),
            ticker: signal.ticker,
            side,
            quantity,
            price,
        });
    }
    (trades, cash)
}

pub struct MomentumStrategy {
    settings: MomentumSettings,
    manager_repository: Arc<dyn ManagerRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl MomentumStrategy {
    pub fn new(
        settings: MomentumSettings,
        manager_repository: Arc<dyn ManagerRepositoryTrait>,
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        price_repository: Arc<dyn PriceRepositoryTrait>,
    ) -> Self {
        Self {
            settings,
            manager_repository,
            holdings_repository,
            price_repository,
        }
    }

    fn signal_for(&self, position: &Position, date: NaiveDate) -> Result<Option<MomentumSignal>> {
        let needed = self.settings.lookback + 1;
        let prices = self
            .price_repository
            .get_recent_prices(&position.ticker, date, needed)?;
        if prices.len() < needed {
            debug!(
                "Momentum skips {}: {} of {} observations",
                position.ticker,
                prices.len(),
                needed
            );
            return Ok(None);
        }

        let prior = prices[0].price;
        let latest = prices[prices.len() - 1].price;
        if prior <= Decimal::ZERO || latest <= Decimal::ZERO {
            debug!("Momentum skips {}: non-positive price", position.ticker);
            return Ok(None);
        }

        Ok(Some(MomentumSignal {
            ticker: position.ticker.clone(),
            held: position.quantity,
            latest_price: latest,
            weekly_return: (latest - prior) / prior,
        }))
    }

    fn build_plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        let bucket = self.bucket();
        let ctx = BucketContext::load(
            bucket,
            self.manager_repository.as_ref(),
            self.holdings_repository.as_ref(),
        )?;

        let mut signals = Vec::new();
        for position in &ctx.invested {
            if let Some(signal) = self.signal_for(position, date)? {
                signals.push(signal);
            }
        }

        let (trades, cash) = allocate(ctx.cash, signals);
        if trades.is_empty() {
            return Ok(StrategyOutcome::unchanged(bucket, date));
        }

        let manager_id = ctx.manager_id().to_string();
        let mut deals = Vec::with_capacity(trades.len());
        let mut positions = Vec::with_capacity(trades.len() + 1);
        for trade in trades {
            debug!(
                "Momentum {} {} {} @ {}",
                trade.side, trade.quantity, trade.ticker, trade.price
            );
            positions.push(Position {
                risk_bucket: bucket,
                ticker: trade.ticker.clone(),
                quantity: trade.new_quantity,
                manager_id: manager_id.clone(),
                last_updated: date,
                spot_price: trade.price,
            });
            deals.push(NewDeal {
                risk_bucket: bucket,
                ticker: trade.ticker,
                execution_date: date,
                manager_id: manager_id.clone(),
                side: trade.side,
                quantity: trade.quantity,
                price: trade.price,
            });
        }
        positions.push(Position::cash(bucket, manager_id, cash, date));

        Ok(StrategyOutcome::rebalanced(RebalancePlan {
            bucket,
            date,
            deals,
            position_writes: PositionWrites::Upsert(positions),
        }))
    }
}

impl RebalanceStrategy for MomentumStrategy {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn bucket(&self) -> RiskBucket {
        RiskBucket::HyEquity
    }

    fn plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        reject_on_configuration(self.bucket(), date, self.build_plan(date))
    }
}
