//! Weekly return statistics: Sharpe, Sortino, drawdown and friends.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::performance_model::PerformanceSummary;
use crate::constants::WEEKS_PER_YEAR;
use crate::utils::statistics::{mean, sample_covariance, sample_std};

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Simple returns between consecutive values. Periods starting from a
/// non-positive value are skipped.
pub fn weekly_returns(values: &[Decimal]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].to_f64()?;
            let next = w[1].to_f64()?;
            (prev > 0.0).then(|| next / prev - 1.0)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PortfolioPerformance {
    returns: Vec<f64>,
    weekly_risk_free: f64,
}

impl PortfolioPerformance {
    /// `annual_risk_free_rate` is converted to a weekly rate.
    pub fn new(returns: Vec<f64>, annual_risk_free_rate: f64) -> Self {
        Self {
            returns: returns.into_iter().filter(|r| r.is_finite()).collect(),
            weekly_risk_free: annual_risk_free_rate / WEEKS_PER_YEAR,
        }
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn sharpe_ratio(&self) -> Option<f64> {
        let excess: Vec<f64> = self.returns.iter().map(|r| r - self.weekly_risk_free).collect();
        let std = non_zero(sample_std(&excess)?)?;
        Some(WEEKS_PER_YEAR.sqrt() * mean(&excess) / std)
    }

    /// Like Sharpe, but only penalizes negative weeks.
    pub fn sortino_ratio(&self) -> Option<f64> {
        let negative: Vec<f64> = self.returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside = non_zero(sample_std(&negative)?)?;
        Some(WEEKS_PER_YEAR.sqrt() * (mean(&self.returns) - self.weekly_risk_free) / downside)
    }

    /// Largest peak-to-trough fall of the compounded series, as a non-positive fraction.
    pub fn max_drawdown(&self) -> Option<f64> {
        if self.returns.is_empty() {
            return None;
        }
        let mut wealth = 1.0;
        let mut peak = f64::MIN;
        let mut worst = 0.0_f64;
        for r in &self.returns {
            wealth *= 1.0 + r;
            peak = peak.max(wealth);
            worst = worst.min((wealth - peak) / peak);
        }
        Some(worst)
    }

    pub fn calmar_ratio(&self) -> Option<f64> {
        if self.returns.is_empty() {
            return None;
        }
        let annual = (1.0 + mean(&self.returns)).powf(WEEKS_PER_YEAR) - 1.0;
        let drawdown = non_zero(self.max_drawdown()?.abs())?;
        Some(annual / drawdown)
    }

    pub fn beta(&self, market_returns: &[f64]) -> Option<f64> {
        let n = self.returns.len().min(market_returns.len());
        let covariance = sample_covariance(&self.returns[..n], &market_returns[..n])?;
        let market_variance = non_zero(sample_std(&market_returns[..n])?.powi(2))?;
        Some(covariance / market_variance)
    }

    /// Jensen's alpha per week.
    pub fn alpha(&self, market_returns: &[f64]) -> Option<f64> {
        let beta = self.beta(market_returns)?;
        let market_premium = mean(market_returns) - self.weekly_risk_free;
        Some((mean(&self.returns) - self.weekly_risk_free) - beta * market_premium)
    }

    pub fn worst_performance(&self) -> Option<f64> {
        self.returns.iter().copied().reduce(f64::min)
    }

    pub fn best_performance(&self) -> Option<f64> {
        self.returns.iter().copied().reduce(f64::max)
    }

    pub fn volatility(&self) -> Option<f64> {
        sample_std(&self.returns)
    }

    pub fn total_return(&self) -> Option<f64> {
        if self.returns.is_empty() {
            return None;
        }
        Some(self.returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0)
    }

    pub fn annualized_return(&self) -> Option<f64> {
        let total = self.total_return()?;
        Some((1.0 + total).powf(WEEKS_PER_YEAR / self.returns.len() as f64) - 1.0)
    }

    pub fn annualized_volatility(&self) -> Option<f64> {
        Some(self.volatility()? * WEEKS_PER_YEAR.sqrt())
    }

    pub fn summary(&self, market_returns: Option<&[f64]>) -> PerformanceSummary {
        PerformanceSummary {
            periods: self.returns.len(),
            sharpe_ratio: self.sharpe_ratio(),
            sortino_ratio: self.sortino_ratio(),
            max_drawdown: self.max_drawdown(),
            calmar_ratio: self.calmar_ratio(),
            worst_weekly_return: self.worst_performance(),
            best_weekly_return: self.best_performance(),
            volatility: self.volatility(),
            total_return: self.total_return(),
            annualized_return: self.annualized_return(),
            annualized_volatility: self.annualized_volatility(),
            beta: market_returns.and_then(|m| self.beta(m)),
            alpha: market_returns.and_then(|m| self.alpha(m)),
        }
    }
}

fn non_zero(value: f64) -> Option<f64> {
    (value.abs() > f64::EPSILON).then_some(value)
}
