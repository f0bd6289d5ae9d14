//! Enriched Table Module
//! Immutable, date-keyed result of the feature pipeline with a polars view
//! for column access.

use crate::data::labels::CalendarLabels;
use crate::data::pipeline::{parse_day_first, PipelineError};
use crate::data::record::EnrichedRecord;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;

pub const COL_DATE: &str = "date";
pub const COL_TEMP_AVG: &str = "temp_avg";
pub const COL_TEMP_MIN: &str = "temp_min";
pub const COL_TEMP_MAX: &str = "temp_max";
pub const COL_RAINFALL: &str = "rainfall";
pub const COL_IS_WEEKEND: &str = "is_weekend";
pub const COL_CONSUMPTION: &str = "consumption";
pub const COL_MONTH: &str = "month_label";
pub const COL_WEEKDAY: &str = "weekday_label";
pub const COL_DELTA: &str = "consumption_delta";
pub const COL_PCT_DELTA: &str = "consumption_pct_delta";

/// Enriched rows in input order, indexed by date.
///
/// Built once by [`crate::data::FeaturePipeline::transform`]; there is no
/// mutable access afterwards.
#[derive(Debug, Clone)]
pub struct EnrichedTable {
    records: Vec<EnrichedRecord>,
    index: HashMap<NaiveDate, usize>,
    frame: DataFrame,
    labels: CalendarLabels,
}

impl EnrichedTable {
    pub(crate) fn from_records(
        records: Vec<EnrichedRecord>,
        labels: CalendarLabels,
    ) -> Result<Self, PipelineError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.date, i).is_some() {
                return Err(PipelineError::DuplicateDate(record.date));
            }
        }

        let frame = Self::build_frame(&records, &labels)?;

        Ok(Self {
            records,
            index,
            frame,
            labels,
        })
    }

    fn build_frame(
        records: &[EnrichedRecord],
        labels: &CalendarLabels,
    ) -> Result<DataFrame, PolarsError> {
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        let weekend: Vec<&str> = records
            .iter()
            .map(|r| labels.weekend_label(r.is_weekend))
            .collect();

        let weekend = Column::new(COL_IS_WEEKEND.into(), weekend).cast(&DataType::Categorical(
            None,
            CategoricalOrdering::Physical,
        ))?;

        DataFrame::new(vec![
            Column::new(COL_DATE.into(), dates),
            Column::new(
                COL_TEMP_AVG.into(),
                records.iter().map(|r| r.temp_avg).collect::<Vec<f64>>(),
            ),
            Column::new(
                COL_TEMP_MIN.into(),
                records.iter().map(|r| r.temp_min).collect::<Vec<f64>>(),
            ),
            Column::new(
                COL_TEMP_MAX.into(),
                records.iter().map(|r| r.temp_max).collect::<Vec<f64>>(),
            ),
            Column::new(
                COL_RAINFALL.into(),
                records.iter().map(|r| r.rainfall).collect::<Vec<f64>>(),
            ),
            weekend,
            Column::new(
                COL_CONSUMPTION.into(),
                records.iter().map(|r| r.consumption).collect::<Vec<i64>>(),
            ),
            Column::new(
                COL_MONTH.into(),
                records.iter().map(|r| r.month_label).collect::<Vec<&str>>(),
            ),
            Column::new(
                COL_WEEKDAY.into(),
                records.iter().map(|r| r.weekday_label).collect::<Vec<&str>>(),
            ),
            Column::new(
                COL_DELTA.into(),
                records
                    .iter()
                    .map(|r| r.consumption_delta)
                    .collect::<Vec<Option<f64>>>(),
            ),
            Column::new(
                COL_PCT_DELTA.into(),
                records
                    .iter()
                    .map(|r| r.consumption_pct_delta)
                    .collect::<Vec<Option<f64>>>(),
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    /// Look up a row by date string (ISO `2015-12-31` or day-first).
    pub fn get(&self, date: &str) -> Option<&EnrichedRecord> {
        parse_day_first(date).and_then(|d| self.get_date(d))
    }

    pub fn get_date(&self, date: NaiveDate) -> Option<&EnrichedRecord> {
        self.index.get(&date).map(|&i| &self.records[i])
    }

    /// Column-style access through the polars view.
    pub fn column(&self, name: &str) -> PolarsResult<&Column> {
        self.frame.column(name)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn labels(&self) -> &CalendarLabels {
        &self.labels
    }

    pub fn weekend_label(&self, record: &EnrichedRecord) -> &'static str {
        self.labels.weekend_label(record.is_weekend)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Rows whose month label matches.
    pub fn month_records<'a>(
        &'a self,
        month_label: &'a str,
    ) -> impl Iterator<Item = &'a EnrichedRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.month_label == month_label)
    }
}

impl<'a> IntoIterator for &'a EnrichedTable {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::slice::Iter<'a, EnrichedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{FeaturePipeline, RawRecord};

    use super::*;

    fn sample_table() -> EnrichedTable {
        let rows = vec![
            RawRecord::from(("30/01/2015", 27.0, 22.0, 32.5, 0.0, 0, 30000)),
            RawRecord::from(("31/01/2015", 28.0, 23.0, 33.0, 0.0, 1, 36000)),
            RawRecord::from(("01/02/2015", 26.0, 21.0, 31.0, 12.5, 1, 27000)),
        ];
        FeaturePipeline::default().transform(&rows).unwrap()
    }

    #[test]
    fn test_frame_shape_and_columns() {
        let table = sample_table();
        let frame = table.frame();
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.width(), 11);

        let consumption = table.column(COL_CONSUMPTION).unwrap();
        let values: Vec<Option<i64>> = consumption.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(30000), Some(36000), Some(27000)]);

        let delta = table.column(COL_DELTA).unwrap();
        let deltas: Vec<Option<f64>> = delta.f64().unwrap().into_iter().collect();
        assert_eq!(deltas, vec![None, Some(6000.0), Some(-9000.0)]);

        assert!(matches!(
            table.column(COL_IS_WEEKEND).unwrap().dtype(),
            DataType::Categorical(_, _)
        ));
        assert_eq!(table.column(COL_DATE).unwrap().dtype(), &DataType::Date);
        assert!(table.column("missing").is_err());
    }

    #[test]
    fn test_lookup_by_date_string_formats() {
        let table = sample_table();
        let iso = table.get("2015-01-31").unwrap();
        let day_first = table.get("31/01/2015").unwrap();
        assert_eq!(iso, day_first);
        assert_eq!(table.weekend_label(iso), "Fim de semana");
        assert!(table.get("2015-02-02").is_none());
        assert!(table.get("garbage").is_none());
    }

    #[test]
    fn test_iteration_and_bounds() {
        let table = sample_table();
        let dates: Vec<NaiveDate> = (&table).into_iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.first_date(), NaiveDate::from_ymd_opt(2015, 1, 30));
        assert_eq!(table.last_date(), NaiveDate::from_ymd_opt(2015, 2, 1));
        assert_eq!(table.month_records("Jan").count(), 2);
        assert_eq!(table.month_records("Fev").count(), 1);
    }
}
