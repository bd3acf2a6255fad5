//! Seeding of managers, cash and the initial ticker universe.

mod setup_service;

pub use setup_service::{BucketSetup, FundSetupService};
