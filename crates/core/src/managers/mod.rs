//! Managers assigned to risk buckets.

mod managers_model;
mod managers_traits;

pub use managers_model::Manager;
pub use managers_traits::ManagerRepositoryTrait;
