//! Beer consumption dashboard.
//!
//! Daily consumption rows with weather readings are turned into a
//! date-keyed table with calendar labels and day-over-day deltas, then
//! shown next to a weather-driven sales forecast.

pub mod charts;
pub mod config;
pub mod data;
pub mod forecast;
pub mod format;
pub mod gui;
pub mod stats;
pub mod summary;

pub use config::DashboardConfig;
pub use data::{EnrichedRecord, EnrichedTable, FeaturePipeline, RawRecord};
pub use summary::DashboardSummary;
