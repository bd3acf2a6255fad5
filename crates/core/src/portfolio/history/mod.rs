//! Portfolio history - dated snapshots derived from the deal log.

mod history_model;
mod history_service;
mod history_traits;

pub use history_model::PortfolioSnapshot;
pub use history_service::{reconstruct_history, unwind_deals, HistoryService};
pub use history_traits::SnapshotRepositoryTrait;
