//! Price ledger - models, repository trait, refresh service and cleaning.

mod market_data_model;
mod market_data_traits;
pub mod outliers;
mod price_refresh_service;

pub use market_data_model::{PriceObservation, RefreshReport};
pub use market_data_traits::PriceRepositoryTrait;
pub use outliers::{OutlierFilter, OutlierMethod};
pub use price_refresh_service::PriceRefreshService;

#[cfg(test)]
mod price_refresh_service_tests;
