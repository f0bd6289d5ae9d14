//! Record Types
//! Raw rows as stored and the enriched rows produced by the pipeline.

use crate::data::labels::WeekendFlag;
use chrono::NaiveDate;

/// One stored observation, in storage column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Day-first date string, e.g. `31/12/2015`
    pub date: String,
    pub temp_avg: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Millimetres
    pub rainfall: f64,
    /// 0/1 as stored
    pub is_weekend_raw: i64,
    /// Litres
    pub consumption: i64,
}

impl<S: Into<String>> From<(S, f64, f64, f64, f64, i64, i64)> for RawRecord {
    fn from(row: (S, f64, f64, f64, f64, i64, i64)) -> Self {
        let (date, temp_avg, temp_min, temp_max, rainfall, is_weekend_raw, consumption) = row;
        Self {
            date: date.into(),
            temp_avg,
            temp_min,
            temp_max,
            rainfall,
            is_weekend_raw,
            consumption,
        }
    }
}

/// A raw record with parsed date, calendar labels and day-over-day deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub date: NaiveDate,
    pub temp_avg: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rainfall: f64,
    pub consumption: i64,
    pub is_weekend: WeekendFlag,
    pub month_label: &'static str,
    pub weekday_label: &'static str,
    /// Absent on the first row
    pub consumption_delta: Option<f64>,
    /// Absent on the first row or after a zero consumption
    pub consumption_pct_delta: Option<f64>,
}
