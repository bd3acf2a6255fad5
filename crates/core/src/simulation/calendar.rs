use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::constants::DAYS_PER_WEEK;

/// Work due on a simulated calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SimulationTrigger {
    /// Load prices for the inclusive window.
    RefreshPrices { start: NaiveDate, end: NaiveDate },
    /// Run every bucket's strategy at `date`.
    RunStrategies { date: NaiveDate },
}

/// Triggers due on `day`, in execution order.
///
/// Mondays refresh the previous Monday..Sunday window, then run the
/// strategies. Any other day yields nothing.
pub fn advance(day: NaiveDate) -> Vec<SimulationTrigger> {
    if day.weekday() != Weekday::Mon {
        return Vec::new();
    }
    vec![
        SimulationTrigger::RefreshPrices {
            start: day - Duration::days(DAYS_PER_WEEK),
            end: day - Duration::days(1),
        },
        SimulationTrigger::RunStrategies { date: day },
    ]
}
