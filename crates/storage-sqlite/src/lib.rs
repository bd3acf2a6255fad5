//! SQLite storage implementation for the fund simulator.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `fund-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for every domain table
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! `fund-core` is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod deals;
pub mod history;
pub mod holdings;
pub mod managers;
pub mod market_data;
pub mod rebalance;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::{IntoCore, StorageError};

pub use deals::DealRepository;
pub use history::SnapshotRepository;
pub use holdings::HoldingsRepository;
pub use managers::ManagerRepository;
pub use market_data::PriceRepository;
pub use rebalance::RebalanceStore;

// Re-export from fund-core for convenience
pub use fund_core::errors::{DatabaseError, Error, Result};
