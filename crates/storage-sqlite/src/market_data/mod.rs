//! SQLite storage for the price ledger.

mod model;
mod repository;

pub use model::ProductDB;
pub use repository::PriceRepository;
