//! Portfolio state: current holdings, reconstructed history and performance.

pub mod history;
pub mod holdings;
pub mod performance;

pub use history::*;
pub use holdings::*;
pub use performance::*;
