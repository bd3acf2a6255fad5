//! Error types shared by the simulator crates.
//!
//! Storage and provider failures are mapped onto these enums at the crate
//! boundary, so nothing here depends on Diesel or SQLite.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

pub use fund_market_data::MarketDataError;

use crate::portfolio::holdings::RiskBucket;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Strategy failed: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    /// A plan or write breaks a fund rule, such as a bucket mismatch.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Storage failures, carried as strings so the core stays backend-free.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate primary key, e.g. a second manager with the same id.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// The writer job failed and its transaction was rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised while a strategy prepares a rebalance plan.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("No manager is assigned to bucket {0}")]
    MissingManager(RiskBucket),

    #[error("Bucket {0} has no CASH position")]
    MissingCash(RiskBucket),

    #[error("Not enough price history for {ticker}: need {required}, found {available}")]
    DataUnavailable {
        ticker: String,
        required: usize,
        available: usize,
    },

    #[error("Numerical failure: {0}")]
    Numerical(String),
}

impl StrategyError {
    /// Configuration problems abort a bucket before any computation happens.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingManager(_) | Self::MissingCash(_))
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}
