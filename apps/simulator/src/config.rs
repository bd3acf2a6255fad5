use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use fund_core::utils::time_utils::parse_date;
use rust_decimal::Decimal;

const DEFAULT_TICKERS: &str = "BTC-USD,ETH-USD,LTC-USD,XRP-USD,TLT,IEF,SPLV";
const DEFAULT_BREAKOUT_TICKERS: &str = "TLT,IEF";

pub struct Config {
    pub db_path: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tickers: Vec<String>,
    pub breakout_tickers: Vec<String>,
    pub initial_cash: Decimal,
    pub seed: Option<u64>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, defaulting unset keys.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db_path = get("FUND_DB_PATH", "./db/fund.db");
        let start_date = parse_date(&get("FUND_START_DATE", "2023-01-01"))
            .context("Invalid FUND_START_DATE")?;
        let end_date =
            parse_date(&get("FUND_END_DATE", "2023-12-31")).context("Invalid FUND_END_DATE")?;
        if start_date > end_date {
            bail!("FUND_START_DATE {} is after FUND_END_DATE {}", start_date, end_date);
        }

        let tickers = split_tickers(&get("FUND_TICKERS", DEFAULT_TICKERS));
        if tickers.is_empty() {
            bail!("FUND_TICKERS must name at least one ticker");
        }
        let breakout_tickers =
            split_tickers(&get("FUND_BREAKOUT_TICKERS", DEFAULT_BREAKOUT_TICKERS));

        let initial_cash = Decimal::from_str(get("FUND_INITIAL_CASH", "100000").trim())
            .context("Invalid FUND_INITIAL_CASH")?;
        if initial_cash < Decimal::ZERO {
            bail!("FUND_INITIAL_CASH must not be negative");
        }

        let seed = match lookup("FUND_SEED") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<u64>().context("Invalid FUND_SEED")?)
            }
            _ => None,
        };
        let log_format = get("FUND_LOG_FORMAT", "text");

        Ok(Self {
            db_path,
            start_date,
            end_date,
            tickers,
            breakout_tickers,
            initial_cash,
            seed,
            log_format,
        })
    }
}

fn split_tickers(raw: &str) -> Vec<String> {
    let mut tickers: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    tickers.dedup();
    tickers
}
