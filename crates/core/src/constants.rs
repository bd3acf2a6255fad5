/// Ticker of the synthetic cash position held by every bucket.
pub const CASH_TICKER: &str = "CASH";

/// Number of calendar days in a simulation week.
pub const DAYS_PER_WEEK: i64 = 7;

/// Weekly periods per year, used to annualize weekly statistics.
pub const WEEKS_PER_YEAR: f64 = 52.0;
