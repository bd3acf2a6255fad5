//! SQLite storage for the deal log.

mod model;
mod repository;

pub use model::DealDB;
pub(crate) use repository::insert_deals;
pub use repository::DealRepository;
