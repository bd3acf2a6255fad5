use serde::{Deserialize, Serialize};

/// Weekly performance indicators of a value series.
///
/// Ratios are `None` when undefined for the sample (too few returns or no
/// dispersion).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub periods: usize,
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub calmar_ratio: Option<f64>,
    pub worst_weekly_return: Option<f64>,
    pub best_weekly_return: Option<f64>,
    pub volatility: Option<f64>,
    pub total_return: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
}
