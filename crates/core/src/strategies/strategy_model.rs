//! Rebalance plans and strategy outcomes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::deals::NewDeal;
use crate::errors::{Error, Result};
use crate::portfolio::holdings::{Position, RiskBucket};

/// Terminal state of one strategy run for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum StrategyStatus {
    Rebalanced,
    Unchanged,
    Rejected(String),
    CapReached,
    AlreadyApplied,
}

impl StrategyStatus {
    pub fn is_rejected(&self) -> bool {
        matches!(self, StrategyStatus::Rejected(_))
    }
}

/// How a plan rewrites the bucket's positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionWrites {
    /// Insert or update the listed rows; other rows stay as they are.
    Upsert(Vec<Position>),
    /// Delete every row of the bucket, then insert the listed rows.
    ReplaceAll(Vec<Position>),
}

impl PositionWrites {
    pub fn positions(&self) -> &[Position] {
        match self {
            PositionWrites::Upsert(p) | PositionWrites::ReplaceAll(p) => p,
        }
    }
}

/// Deals and position writes a strategy proposes for one bucket on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancePlan {
    pub bucket: RiskBucket,
    pub date: NaiveDate,
    pub deals: Vec<NewDeal>,
    pub position_writes: PositionWrites,
}

impl RebalancePlan {
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty() && self.position_writes.positions().is_empty()
    }

    /// Every deal and position must be valid and belong to the plan's bucket.
    pub fn validate(&self) -> Result<()> {
        for deal in &self.deals {
            deal.validate()?;
            if deal.risk_bucket != self.bucket {
                return Err(Error::ConstraintViolation(format!(
                    "Deal for {} in a {} plan",
                    deal.risk_bucket, self.bucket
                )));
            }
        }
        for position in self.position_writes.positions() {
            position.validate()?;
            if position.risk_bucket != self.bucket {
                return Err(Error::ConstraintViolation(format!(
                    "Position for {} in a {} plan",
                    position.risk_bucket, self.bucket
                )));
            }
        }
        Ok(())
    }
}

/// Result of running a strategy: a status, and a plan when something should change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub bucket: RiskBucket,
    pub date: NaiveDate,
    pub status: StrategyStatus,
    pub plan: Option<RebalancePlan>,
}

impl StrategyOutcome {
    pub fn rebalanced(plan: RebalancePlan) -> Self {
        Self {
            bucket: plan.bucket,
            date: plan.date,
            status: StrategyStatus::Rebalanced,
            plan: Some(plan),
        }
    }

    pub fn without_plan(bucket: RiskBucket, date: NaiveDate, status: StrategyStatus) -> Self {
        Self {
            bucket,
            date,
            status,
            plan: None,
        }
    }

    pub fn unchanged(bucket: RiskBucket, date: NaiveDate) -> Self {
        Self::without_plan(bucket, date, StrategyStatus::Unchanged)
    }

    pub fn rejected(bucket: RiskBucket, date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::without_plan(bucket, date, StrategyStatus::Rejected(reason.into()))
    }

    pub fn deal_count(&self) -> usize {
        self.plan.as_ref().map_or(0, |p| p.deals.len())
    }
}
