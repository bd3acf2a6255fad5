//! SQLite storage for bucket positions.

mod model;
mod repository;

pub use model::PositionDB;
pub use repository::HoldingsRepository;
pub(crate) use repository::apply_position_writes;
