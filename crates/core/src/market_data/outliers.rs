//! Removal of aberrant prices before they reach the ledger.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::market_data_model::PriceObservation;

const LOWER_PERCENTILE: f64 = 0.01;
const UPPER_PERCENTILE: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Drops prices whose absolute z-score reaches the threshold.
    ZScore,
    /// Drops prices outside `[Q1 - t * IQR, Q3 + t * IQR]`.
    Iqr,
    /// Drops prices outside the 1st..99th percentile band. The threshold is unused.
    Percentile,
}

/// Per-ticker outlier filter applied to a batch of fetched prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierFilter {
    pub method: OutlierMethod,
    pub threshold: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::zscore(3.0)
    }
}

impl OutlierFilter {
    pub fn zscore(threshold: f64) -> Self {
        Self {
            method: OutlierMethod::ZScore,
            threshold,
        }
    }

    pub fn iqr(threshold: f64) -> Self {
        Self {
            method: OutlierMethod::Iqr,
            threshold,
        }
    }

    pub fn percentile() -> Self {
        Self {
            method: OutlierMethod::Percentile,
            threshold: 0.0,
        }
    }

    /// Filters each ticker's prices independently, preserving input order.
    ///
    /// Tickers with fewer than two prices, or with no dispersion, are kept as is.
    pub fn apply(&self, prices: Vec<PriceObservation>) -> Vec<PriceObservation> {
        let mut by_ticker: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for obs in &prices {
            if let Some(value) = obs.price.to_f64() {
                by_ticker.entry(obs.ticker.clone()).or_default().push(value);
            }
        }

        let bounds: BTreeMap<String, (f64, f64)> = by_ticker
            .into_iter()
            .filter_map(|(ticker, values)| self.bounds(&values).map(|b| (ticker, b)))
            .collect();

        prices
            .into_iter()
            .filter(|obs| match (bounds.get(&obs.ticker), obs.price.to_f64()) {
                (Some((low, high)), Some(value)) => self.keeps(value, *low, *high),
                _ => true,
            })
            .collect()
    }

    fn keeps(&self, value: f64, low: f64, high: f64) -> bool {
        match self.method {
            // z-score bounds are exclusive, the quantile bands inclusive.
            OutlierMethod::ZScore => value > low && value < high,
            OutlierMethod::Iqr | OutlierMethod::Percentile => value >= low && value <= high,
        }
    }

    fn bounds(&self, values: &[f64]) -> Option<(f64, f64)> {
        if values.len() < 2 {
            return None;
        }
        match self.method {
            OutlierMethod::ZScore => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                let std = var.sqrt();
                if std <= f64::EPSILON {
                    return None;
                }
                Some((mean - self.threshold * std, mean + self.threshold * std))
            }
            OutlierMethod::Iqr => {
                let sorted = sorted(values);
                let q1 = quantile(&sorted, 0.25);
                let q3 = quantile(&sorted, 0.75);
                let iqr = q3 - q1;
                Some((q1 - self.threshold * iqr, q3 + self.threshold * iqr))
            }
            OutlierMethod::Percentile => {
                let sorted = sorted(values);
                Some((
                    quantile(&sorted, LOWER_PERCENTILE),
                    quantile(&sorted, UPPER_PERCENTILE),
                ))
            }
        }
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
