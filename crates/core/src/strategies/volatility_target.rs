//! Monte Carlo volatility-targeted optimizer for the low-risk bucket.
//!
//! Random long-only allocations are drawn, filtered against trade-size,
//! volatility and budget limits, and valued by simulating a week of
//! correlated daily returns. The current portfolio is kept unless a
//! candidate has a strictly higher expected gain.

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use num_traits::{FromPrimitive, ToPrimitive};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::bucket_context::BucketContext;
use super::strategy_model::{PositionWrites, RebalancePlan, StrategyOutcome};
use super::strategy_settings::OptimizerSettings;
use super::strategy_traits::{reject_on_configuration, RebalanceStrategy};
use crate::deals::{NewDeal, TradeSide};
use crate::errors::{Error, Result, StrategyError};
use crate::managers::ManagerRepositoryTrait;
use crate::market_data::PriceRepositoryTrait;
use crate::portfolio::holdings::{HoldingsRepositoryTrait, Position, RiskBucket};
use crate::utils::statistics::{
    covariance_matrix, log_returns, mean, quadratic_form, MultivariateNormal,
};

/// Aligned observations needed to estimate a covariance from two returns.
const MIN_OBSERVATIONS: usize = 3;

/// Market state the search runs against, one entry per ticker.
#[derive(Debug, Clone)]
pub struct OptimizerInput {
    pub tickers: Vec<String>,
    pub held: Vec<Decimal>,
    pub prices: Vec<Decimal>,
    pub cash: Decimal,
    pub mean_returns: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
}

impl OptimizerInput {
    /// Builds the input from aligned price histories (oldest first).
    pub fn from_histories(
        tickers: Vec<String>,
        held: Vec<Decimal>,
        cash: Decimal,
        histories: &[Vec<Decimal>],
    ) -> Result<Self> {
        let mut series = Vec::with_capacity(histories.len());
        let mut prices = Vec::with_capacity(histories.len());
        for (ticker, history) in tickers.iter().zip(histories) {
            if history.len() < MIN_OBSERVATIONS {
                return Err(StrategyError::DataUnavailable {
                    ticker: ticker.clone(),
                    required: MIN_OBSERVATIONS,
                    available: history.len(),
                }
                .into());
            }
            let values: Vec<f64> = history.iter().filter_map(|p| p.to_f64()).collect();
            if values.len() != history.len() || values.iter().any(|v| *v <= 0.0) {
                return Err(StrategyError::Numerical(format!(
                    "Unusable price history for {}",
                    ticker
                ))
                .into());
            }
            series.push(log_returns(&values));
            prices.push(history[history.len() - 1]);
        }

        Ok(Self {
            mean_returns: series.iter().map(|r| mean(r)).collect(),
            covariance: covariance_matrix(&series),
            tickers,
            held,
            prices,
            cash,
        })
    }

    fn holdings_value(&self) -> Decimal {
        self.held.iter().zip(&self.prices).map(|(q, p)| q * p).sum()
    }
}

/// Allocation that passed every limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub quantities: Vec<Decimal>,
    pub net_cost: Decimal,
    pub expected_gain: f64,
}

/// Why a random allocation was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRejection {
    DeltaOutOfBounds,
    VolatilityAboveTarget,
    OverBudget,
    Unrepresentable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    pub baseline_gain: f64,
    pub evaluated: usize,
    pub rejected: BTreeMap<String, usize>,
    /// `None` when the current portfolio stays the best.
    pub winner: Option<Candidate>,
}

/// Monte Carlo search over random long-only allocations.
pub struct VolatilityTargetOptimizer<'a> {
    settings: &'a OptimizerSettings,
    input: &'a OptimizerInput,
    mvn: MultivariateNormal,
    horizon_covariance: Vec<Vec<f64>>,
}

impl<'a> VolatilityTargetOptimizer<'a> {
    pub fn new(settings: &'a OptimizerSettings, input: &'a OptimizerInput) -> Self {
        let horizon = settings.horizon_days as f64;
        let horizon_covariance: Vec<Vec<f64>> = input
            .covariance
            .iter()
            .map(|row| row.iter().map(|c| c * horizon).collect())
            .collect();
        Self {
            mvn: MultivariateNormal::new(input.mean_returns.clone(), &input.covariance),
            settings,
            input,
            horizon_covariance,
        }
    }

    /// Mean simulated terminal value minus current cost of `quantities`.
    pub fn expected_gain<R: Rng + ?Sized>(&self, quantities: &[f64], rng: &mut R) -> f64 {
        let prices: Vec<f64> = self.input.prices.iter().filter_map(|p| p.to_f64()).collect();
        let cost: f64 = quantities.iter().zip(&prices).map(|(q, p)| q * p).sum();
        let trials = self.settings.trials.max(1);

        let mut total = 0.0;
        for _ in 0..trials {
            let mut cumulative = vec![0.0; self.mvn.dimension()];
            for _ in 0..self.settings.horizon_days {
                for (acc, r) in cumulative.iter_mut().zip(self.mvn.sample(rng)) {
                    *acc += r;
                }
            }
            total += quantities
                .iter()
                .zip(&prices)
                .zip(&cumulative)
                .map(|((q, p), c)| q * p * c.exp())
                .sum::<f64>();
        }
        total / trials as f64 - cost
    }

    /// Horizon volatility `sqrt(wᵀ (h·Σ) w)` of a weight vector.
    pub fn horizon_volatility(&self, weights: &[f64]) -> f64 {
        quadratic_form(weights, &self.horizon_covariance).max(0.0).sqrt()
    }

    /// Turns weights into whole quantities and checks every limit.
    pub fn evaluate_weights(
        &self,
        weights: &[f64],
    ) -> std::result::Result<(Vec<Decimal>, Decimal), CandidateRejection> {
        let budget = (self.input.cash + self.input.holdings_value())
            .to_f64()
            .ok_or(CandidateRejection::Unrepresentable)?;
        let min_delta = Decimal::from(self.settings.min_delta);
        let max_delta = Decimal::from(self.settings.max_delta);

        let mut quantities = Vec::with_capacity(weights.len());
        let mut net_cost = Decimal::ZERO;
        for (i, w) in weights.iter().enumerate() {
            let price = self.input.prices[i];
            let price_f = price.to_f64().ok_or(CandidateRejection::Unrepresentable)?;
            let target = Decimal::from_f64((w * budget / price_f).floor())
                .ok_or(CandidateRejection::Unrepresentable)?;
            let delta = target - self.input.held[i];
            if delta < min_delta || delta > max_delta {
                return Err(CandidateRejection::DeltaOutOfBounds);
            }
            net_cost += delta * price;
            quantities.push(target);
        }

        if self.horizon_volatility(weights) > self.settings.target_volatility {
            return Err(CandidateRejection::VolatilityAboveTarget);
        }
        if net_cost > self.input.cash {
            return Err(CandidateRejection::OverBudget);
        }
        Ok((quantities, net_cost))
    }

    pub fn search<R: Rng + ?Sized>(&self, rng: &mut R) -> SearchReport {
        let held: Vec<f64> = self.input.held.iter().filter_map(|q| q.to_f64()).collect();
        let mut report = SearchReport {
            baseline_gain: self.expected_gain(&held, rng),
            ..Default::default()
        };
        let mut best_gain = report.baseline_gain;
        let n = self.input.tickers.len();

        for _ in 0..self.settings.num_simulations {
            let raw: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
            let sum: f64 = raw.iter().sum();
            if sum <= 0.0 {
                continue;
            }
            let weights: Vec<f64> = raw.iter().map(|w| w / sum).collect();

            let (quantities, net_cost) = match self.evaluate_weights(&weights) {
                Ok(c) => c,
                Err(reason) => {
                    *report.rejected.entry(format!("{:?}", reason)).or_default() += 1;
                    continue;
                }
            };

            report.evaluated += 1;
            let q: Vec<f64> = quantities.iter().filter_map(|q| q.to_f64()).collect();
            let gain = self.expected_gain(&q, rng);
            if gain > best_gain {
                best_gain = gain;
                report.winner = Some(Candidate {
                    quantities,
                    net_cost,
                    expected_gain: gain,
                });
            }
        }
        report
    }
}

pub struct VolatilityTargetStrategy {
    settings: OptimizerSettings,
    manager_repository: Arc<dyn ManagerRepositoryTrait>,
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    price_repository: Arc<dyn PriceRepositoryTrait>,
}

impl VolatilityTargetStrategy {
    pub fn new(
        settings: OptimizerSettings,
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

    /// Seeded runs mix the date in so successive Mondays draw different paths.
    fn rng_for(&self, date: NaiveDate) -> StdRng {
        match self.settings.seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed.wrapping_add(date.num_days_from_ce() as u64))
            }
            None => StdRng::from_entropy(),
        }
    }

    /// Price histories of every invested ticker restricted to their common dates.
    fn aligned_histories(
        &self,
        invested: &[Position],
        date: NaiveDate,
    ) -> Result<Vec<Vec<Decimal>>> {
        let mut by_ticker = Vec::with_capacity(invested.len());
        for position in invested {
            let history: BTreeMap<NaiveDate, Decimal> = self
                .price_repository
                .get_price_history(&position.ticker, date)?
                .into_iter()
                .filter(|p| p.is_tradable())
                .map(|p| (p.date, p.price))
                .collect();
            if history.is_empty() {
                return Err(StrategyError::DataUnavailable {
                    ticker: position.ticker.clone(),
                    required: MIN_OBSERVATIONS,
                    available: 0,
                }
                .into());
            }
            by_ticker.push(history);
        }

        let mut common: BTreeSet<NaiveDate> = by_ticker[0].keys().copied().collect();
        for history in &by_ticker[1..] {
            common.retain(|d| history.contains_key(d));
        }

        Ok(by_ticker
            .iter()
            .map(|history| common.iter().filter_map(|d| history.get(d).copied()).collect())
            .collect())
    }

    fn build_plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        let bucket = self.bucket();
        let ctx = BucketContext::load(
            bucket,
            self.manager_repository.as_ref(),
            self.holdings_repository.as_ref(),
        )?;
        if ctx.invested.is_empty() {
            return Ok(StrategyOutcome::rejected(bucket, date, "no tickers to allocate"));
        }

        let input = match self.aligned_histories(&ctx.invested, date).and_then(|histories| {
            OptimizerInput::from_histories(
                ctx.invested.iter().map(|p| p.ticker.clone()).collect(),
                ctx.invested.iter().map(|p| p.quantity).collect(),
                ctx.cash,
                &histories,
            )
        }) {
            Ok(input) => input,
            Err(Error::Strategy(e)) => {
                info!("Optimizer rejected {} on {}: {}", bucket, date, e);
                return Ok(StrategyOutcome::rejected(bucket, date, e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let optimizer = VolatilityTargetOptimizer::new(&self.settings, &input);
        let report = optimizer.search(&mut self.rng_for(date));
        debug!(
            "Optimizer {} on {}: baseline gain {:.4}, {} evaluated, rejected {:?}",
            bucket, date, report.baseline_gain, report.evaluated, report.rejected
        );

        let Some(winner) = report.winner else {
            return Ok(StrategyOutcome::unchanged(bucket, date));
        };

        let manager_id = ctx.manager_id().to_string();
        let mut positions = Vec::with_capacity(input.tickers.len() + 1);
        let mut deals = Vec::new();
        for (i, ticker) in input.tickers.iter().enumerate() {
            let quantity = winner.quantities[i];
            let price = input.prices[i];
            positions.push(Position {
                risk_bucket: bucket,
                ticker: ticker.clone(),
                quantity,
                manager_id: manager_id.clone(),
                last_updated: date,
                spot_price: price,
            });

            let delta = quantity - input.held[i];
            if let Some(side) = TradeSide::from_delta(delta) {
                deals.push(NewDeal {
                    risk_bucket: bucket,
                    ticker: ticker.clone(),
                    execution_date: date,
                    manager_id: manager_id.clone(),
                    side,
                    quantity: delta.abs(),
                    price,
                });
            }
        }
        positions.push(Position::cash(
            bucket,
            manager_id,
            input.cash - winner.net_cost,
            date,
        ));

        info!(
            "Optimizer rebalanced {} on {}: expected gain {:.2} vs baseline {:.2}",
            bucket, date, winner.expected_gain, report.baseline_gain
        );
        Ok(StrategyOutcome::rebalanced(RebalancePlan {
            bucket,
            date,
            deals,
            position_writes: PositionWrites::ReplaceAll(positions),
        }))
    }
}

impl RebalanceStrategy for VolatilityTargetStrategy {
    fn name(&self) -> &'static str {
        "volatility_target"
    }

    fn bucket(&self) -> RiskBucket {
        RiskBucket::LowRisk
    }

    fn plan(&self, date: NaiveDate) -> Result<StrategyOutcome> {
        reject_on_configuration(self.bucket(), date, self.build_plan(date))
    }
}
