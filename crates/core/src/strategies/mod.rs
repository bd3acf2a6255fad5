//! Strategy engine - per-bucket rebalancing rules and their plans.

mod bucket_context;
pub mod breakout;
pub mod momentum;
mod strategy_model;
mod strategy_settings;
mod strategy_traits;
pub mod volatility_target;

pub use breakout::BreakoutStrategy;
pub use momentum::MomentumStrategy;
pub use strategy_model::*;
pub use strategy_settings::*;
pub use strategy_traits::{RebalanceStoreTrait, RebalanceStrategy};
pub use volatility_target::VolatilityTargetStrategy;

#[cfg(test)]
mod momentum_tests;
#[cfg(test)]
mod volatility_target_tests;
