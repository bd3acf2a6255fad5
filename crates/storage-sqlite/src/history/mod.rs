//! SQLite storage for reconstructed portfolio history.

mod model;
mod repository;

pub use model::SnapshotDB;
pub use repository::SnapshotRepository;
