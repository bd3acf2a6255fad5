//! Deal log - immutable executed trades.

mod deals_model;
mod deals_traits;

pub use deals_model::{Deal, NewDeal, TradeSide};
pub use deals_traits::DealRepositoryTrait;
