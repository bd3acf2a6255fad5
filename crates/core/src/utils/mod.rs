pub mod statistics;
pub mod time_utils;
