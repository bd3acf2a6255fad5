//! Weekly simulation: calendar triggers, the replay driver and its reports.

mod calendar;
mod simulation_model;
mod simulation_service;

pub use calendar::{advance, SimulationTrigger};
pub use simulation_model::{BucketValuation, SimulationStep, SimulationSummary};
pub use simulation_service::SimulationService;
