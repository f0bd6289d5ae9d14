//! Feature Pipeline Module
//! Turns raw consumption rows into a date-keyed table with calendar labels
//! and day-over-day consumption deltas.

use crate::data::labels::{CalendarLabels, WeekendFlag};
use crate::data::record::{EnrichedRecord, RawRecord};
use crate::data::table::EnrichedTable;
use chrono::{Datelike, NaiveDate};
use polars::prelude::PolarsError;
use thiserror::Error;
use tracing::{debug, warn};

/// Day-first layouts with a four-digit year.
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
/// Day-first layouts with a two-digit year (`15` is 2015).
const SHORT_YEAR_FORMATS: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];
const ISO_FORMATS: [&str; 1] = ["%Y-%m-%d"];

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },
    #[error("Row {row}: unknown weekend flag {value}")]
    UnknownWeekendFlag { row: usize, value: i64 },
    #[error("Row {row}: no label for month {month}")]
    UnknownMonth { row: usize, month: u32 },
    #[error("Row {row}: no label for weekday {weekday}")]
    UnknownWeekday { row: usize, weekday: u32 },
    #[error("Duplicate date {0}")]
    DuplicateDate(NaiveDate),
    #[error("Row {row}: {current} follows {previous}, rows must be in ascending date order")]
    OutOfOrder {
        row: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// How the pipeline treats rows that are not in ascending date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderPolicy {
    /// Reject a row dated before its predecessor
    #[default]
    RequireAscending,
    /// Compute deltas between adjacent rows as given
    AsGiven,
}

impl OrderPolicy {
    pub fn from_require_sorted(require_sorted: bool) -> Self {
        if require_sorted {
            OrderPolicy::RequireAscending
        } else {
            OrderPolicy::AsGiven
        }
    }
}

/// Parse a date string day-first.
///
/// The year must have four digits, or two for the short form; ISO dates
/// are recognised by a leading four-digit year.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let parts: Vec<&str> = value.split(['/', '-', '.']).collect();
    let [first, _, last] = parts.as_slice() else {
        return None;
    };

    let formats: &[&str] = match (first.len(), last.len()) {
        (4, _) => &ISO_FORMATS,
        (_, 4) => &DAY_FIRST_FORMATS,
        (_, 2) => &SHORT_YEAR_FORMATS,
        _ => return None,
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Round half-to-even at two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Calendar feature derivation over raw rows.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    labels: CalendarLabels,
    order: OrderPolicy,
}

impl FeaturePipeline {
    pub fn new(labels: CalendarLabels, order: OrderPolicy) -> Self {
        Self { labels, order }
    }

    pub fn labels(&self) -> &CalendarLabels {
        &self.labels
    }

    /// Build the enriched table. Output has exactly one row per input row.
    pub fn transform(&self, rows: &[RawRecord]) -> Result<EnrichedTable, PipelineError> {
        debug!(rows = rows.len(), order = ?self.order, "deriving calendar features");

        let mut records: Vec<EnrichedRecord> = Vec::with_capacity(rows.len());
        let mut previous: Option<(NaiveDate, i64)> = None;

        for (row, raw) in rows.iter().enumerate() {
            let date = parse_day_first(&raw.date).ok_or_else(|| PipelineError::InvalidDate {
                row,
                value: raw.date.clone(),
            })?;

            let is_weekend = WeekendFlag::from_raw(raw.is_weekend_raw).ok_or(
                PipelineError::UnknownWeekendFlag {
                    row,
                    value: raw.is_weekend_raw,
                },
            )?;

            let month = date.month();
            let month_label = self
                .labels
                .month(month)
                .ok_or(PipelineError::UnknownMonth { row, month })?;

            let weekday = date.weekday().num_days_from_monday();
            let weekday_label = self
                .labels
                .weekday(weekday)
                .ok_or(PipelineError::UnknownWeekday { row, weekday })?;

            let (consumption_delta, consumption_pct_delta) = match previous {
                Some((prev_date, prev_consumption)) => {
                    if date < prev_date {
                        match self.order {
                            OrderPolicy::RequireAscending => {
                                return Err(PipelineError::OutOfOrder {
                                    row,
                                    previous: prev_date,
                                    current: date,
                                })
                            }
                            OrderPolicy::AsGiven => warn!(
                                row,
                                %prev_date,
                                %date,
                                "row out of date order, delta taken against previous row"
                            ),
                        }
                    }
                    Self::deltas(prev_consumption, raw.consumption)
                }
                None => (None, None),
            };
            previous = Some((date, raw.consumption));

            records.push(EnrichedRecord {
                date,
                temp_avg: raw.temp_avg,
                temp_min: raw.temp_min,
                temp_max: raw.temp_max,
                rainfall: raw.rainfall,
                consumption: raw.consumption,
                is_weekend,
                month_label,
                weekday_label,
                consumption_delta,
                consumption_pct_delta,
            });
        }

        EnrichedTable::from_records(records, self.labels)
    }

    /// Difference and fractional change against the previous row.
    fn deltas(previous: i64, current: i64) -> (Option<f64>, Option<f64>) {
        let diff = current as f64 - previous as f64;
        let pct = if previous == 0 {
            None
        } else {
            Some(round2(diff / previous as f64))
        };
        (Some(round2(diff)), pct)
    }
}
