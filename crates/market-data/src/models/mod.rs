//! Market data models
//!
//! - `price` - Daily closing price bars returned by providers

mod price;

pub use price::PriceBar;
