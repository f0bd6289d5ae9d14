//! Data module - dataset loading and feature derivation

mod labels;
mod loader;
mod pipeline;
mod record;
mod table;

pub use labels::{CalendarLabels, Locale, WeekendFlag};
pub use loader::{DataLoader, LoaderError};
pub use pipeline::{parse_day_first, round2, FeaturePipeline, OrderPolicy, PipelineError};
pub use record::{EnrichedRecord, RawRecord};
pub use table::{
    EnrichedTable, COL_CONSUMPTION, COL_DATE, COL_DELTA, COL_IS_WEEKEND, COL_MONTH, COL_PCT_DELTA,
    COL_RAINFALL, COL_TEMP_AVG, COL_TEMP_MAX, COL_TEMP_MIN, COL_WEEKDAY,
};
