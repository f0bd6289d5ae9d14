//! Stats module - aggregations over the enriched table

mod calculator;

pub use calculator::{ConsumptionStats, MonthSplit, StatsCalculator};
