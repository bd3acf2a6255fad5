use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market_data::RefreshReport;
use crate::portfolio::holdings::RiskBucket;
use crate::strategies::StrategyOutcome;

/// Value of a bucket after a simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketValuation {
    pub bucket: RiskBucket,
    pub date: NaiveDate,
    pub invested_value: Decimal,
    pub cash: Decimal,
}

impl BucketValuation {
    pub fn total_value(&self) -> Decimal {
        self.invested_value + self.cash
    }
}

/// Everything that happened on one simulated Monday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStep {
    pub date: NaiveDate,
    pub refresh: Option<RefreshReport>,
    pub outcomes: Vec<StrategyOutcome>,
    /// Whether the step's plans were written. `false` after a rolled back commit.
    pub committed: bool,
    pub deals_written: usize,
    pub valuations: Vec<BucketValuation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub mondays_processed: usize,
    pub first_monday: Option<NaiveDate>,
    pub last_monday: Option<NaiveDate>,
    pub steps: Vec<SimulationStep>,
}

impl SimulationSummary {
    /// Total value of a bucket at each processed Monday.
    pub fn value_series(&self, bucket: RiskBucket) -> Vec<(NaiveDate, Decimal)> {
        self.steps
            .iter()
            .flat_map(|step| step.valuations.iter())
            .filter(|v| v.bucket == bucket)
            .map(|v| (v.date, v.total_value()))
            .collect()
    }

    pub fn total_deals(&self) -> usize {
        self.steps.iter().map(|s| s.deals_written).sum()
    }
}
