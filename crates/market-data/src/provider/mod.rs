//! Price provider abstractions and implementations.
//!
//! The simulator only needs daily closes for a ticker over a date window,
//! so the provider surface is a single fetch method.

mod traits;

pub mod yahoo;

pub use traits::PriceProvider;
