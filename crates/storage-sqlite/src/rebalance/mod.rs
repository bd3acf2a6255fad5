//! Atomic commit of a simulation step's rebalance plans.

mod store;

pub use store::RebalanceStore;
