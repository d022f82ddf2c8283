//! Analysis modules.
//!
//! Categorical aggregation lives in `aggregator`; monthly popularity
//! trends and their forecast live in `forecast`.

pub mod aggregator;
pub mod forecast;

pub use aggregator::*;
pub use forecast::{ForecastSettings, TrendPoint, Trends};
