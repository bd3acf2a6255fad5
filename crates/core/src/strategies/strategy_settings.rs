use serde::{Deserialize, Serialize};

/// Tunables of the momentum rebalance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentumSettings {
    /// Observations between the reference price and the latest price.
    pub lookback: usize,
}

impl Default for MomentumSettings {
    fn default() -> Self {
        Self { lookback: 7 }
    }
}

/// Tunables of the breakout signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakoutSettings {
    pub tickers: Vec<String>,
    /// Observations used for the moving average and period return.
    pub window: usize,
    /// Observations before the latest one forming the high/low range.
    pub range: usize,
    pub monthly_cap: i64,
    /// Apply executed decisions to positions and cash.
    pub updates_holdings: bool,
}

impl Default for BreakoutSettings {
    fn default() -> Self {
        Self {
            tickers: vec!["TLT".to_string(), "IEF".to_string()],
            window: 20,
            range: 7,
            monthly_cap: 2,
            updates_holdings: false,
        }
    }
}

/// Tunables of the Monte Carlo volatility-targeted optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerSettings {
    /// Random candidates generated per run.
    pub num_simulations: usize,
    /// Monte Carlo paths per valuation.
    pub trials: usize,
    pub horizon_days: usize,
    pub target_volatility: f64,
    /// Lowest accepted per-ticker quantity change.
    pub min_delta: i64,
    /// Highest accepted per-ticker quantity change.
    pub max_delta: i64,
    pub seed: Option<u64>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            num_simulations: 200,
            trials: 30,
            horizon_days: 7,
            target_volatility: 0.10,
            min_delta: -10_000,
            max_delta: 150_000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategySettings {
    pub momentum: MomentumSettings,
    pub breakout: BreakoutSettings,
    pub optimizer: OptimizerSettings,
}
