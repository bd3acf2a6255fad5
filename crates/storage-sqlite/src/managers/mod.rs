//! SQLite storage for bucket managers.

mod model;
mod repository;

pub use model::ManagerDB;
pub use repository::ManagerRepository;
