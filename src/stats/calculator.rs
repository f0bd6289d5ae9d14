//! Statistics Calculator Module
//! Consumption aggregations by month, weekday and weekend category, plus
//! descriptive statistics and correlations used by the charts.

use crate::data::{EnrichedRecord, EnrichedTable};
use rayon::prelude::*;
use statrs::statistics::{Data, Distribution, Max, Median, Min};
use std::collections::BTreeMap;

/// Descriptive statistics for one group of daily consumption values.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionStats {
    pub label: String,
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ConsumptionStats {
    fn default() -> Self {
        Self {
            label: String::new(),
            count: 0,
            total: 0.0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Monthly consumption split by weekend category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSplit {
    pub month: &'static str,
    pub weekday_total: i64,
    pub weekend_total: i64,
}

impl MonthSplit {
    pub fn total(&self) -> i64 {
        self.weekday_total + self.weekend_total
    }
}

/// Aggregations over an [`EnrichedTable`].
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn total_consumption(table: &EnrichedTable) -> i64 {
        table.iter().map(|r| r.consumption).sum()
    }

    /// Totals per month label, calendar order, months present only.
    pub fn totals_by_month(table: &EnrichedTable) -> Vec<(&'static str, i64)> {
        Self::group_by_month(table)
            .into_iter()
            .map(|(_, (label, records))| (label, records.iter().map(|r| r.consumption).sum()))
            .collect()
    }

    /// Totals per month split into weekday and weekend consumption.
    pub fn totals_by_month_and_weekend(table: &EnrichedTable) -> Vec<MonthSplit> {
        Self::group_by_month(table)
            .into_iter()
            .map(|(_, (month, records))| {
                let (weekend, weekday): (Vec<&EnrichedRecord>, Vec<&EnrichedRecord>) = records
                    .into_iter()
                    .partition(|r| r.is_weekend.is_weekend());
                MonthSplit {
                    month,
                    weekday_total: weekday.iter().map(|r| r.consumption).sum(),
                    weekend_total: weekend.iter().map(|r| r.consumption).sum(),
                }
            })
            .collect()
    }

    /// Totals per weekday label within one month, Monday first.
    pub fn totals_by_weekday(table: &EnrichedTable, month_label: &str) -> Vec<(&'static str, i64)> {
        let labels = table.labels();
        let mut totals: BTreeMap<usize, (&'static str, i64)> = BTreeMap::new();
        for record in table.month_records(month_label) {
            let idx = labels.weekday_index(record.weekday_label).unwrap_or(usize::MAX);
            let entry = totals.entry(idx).or_insert((record.weekday_label, 0));
            entry.1 += record.consumption;
        }
        totals.into_values().collect()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ConsumptionStats {
        if values.is_empty() {
            return ConsumptionStats::default();
        }

        let data = Data::new(values.to_vec());
        let std = if values.len() > 1 {
            data.std_dev().unwrap_or(f64::NAN)
        } else {
            0.0
        };

        ConsumptionStats {
            label: String::new(),
            count: values.len(),
            total: values.iter().sum(),
            mean: data.mean().unwrap_or(f64::NAN),
            median: data.median(),
            std,
            min: data.min(),
            max: data.max(),
        }
    }

    /// Per-month statistics, computed in parallel, calendar order.
    pub fn monthly_stats_parallel(table: &EnrichedTable) -> Vec<ConsumptionStats> {
        let groups: Vec<(&'static str, Vec<f64>)> = Self::group_by_month(table)
            .into_values()
            .map(|(label, records)| {
                (
                    label,
                    records.iter().map(|r| r.consumption as f64).collect(),
                )
            })
            .collect();

        groups
            .par_iter()
            .map(|(label, values)| {
                let mut stats = Self::compute_descriptive_stats(values);
                stats.label = label.to_string();
                stats
            })
            .collect()
    }

    /// Pearson correlation; `None` when undefined.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
        let n = xs.len();
        if n < 2 || n != ys.len() {
            return None;
        }

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denom = (var_x * var_y).sqrt();
        if denom == 0.0 {
            None
        } else {
            Some(cov / denom)
        }
    }

    /// Correlation of consumption against a weather field.
    pub fn consumption_correlation<F>(table: &EnrichedTable, field: F) -> Option<f64>
    where
        F: Fn(&EnrichedRecord) -> f64,
    {
        let xs: Vec<f64> = table.iter().map(&field).collect();
        let ys: Vec<f64> = table.iter().map(|r| r.consumption as f64).collect();
        Self::pearson(&xs, &ys)
    }

    /// Records grouped by calendar month position.
    fn group_by_month(
        table: &EnrichedTable,
    ) -> BTreeMap<usize, (&'static str, Vec<&EnrichedRecord>)> {
        let labels = table.labels();
        let mut groups: BTreeMap<usize, (&'static str, Vec<&EnrichedRecord>)> = BTreeMap::new();
        for record in table {
            let idx = labels.month_index(record.month_label).unwrap_or(usize::MAX);
            groups
                .entry(idx)
                .or_insert_with(|| (record.month_label, Vec::new()))
                .1
                .push(record);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeaturePipeline, RawRecord};

    fn table() -> EnrichedTable {
        let rows = vec![
            // Thu, Fri, Sat in January; Sun, Mon in February
            RawRecord::from(("29/01/2015", 25.0, 20.0, 30.0, 0.0, 0, 20000)),
            RawRecord::from(("30/01/2015", 26.0, 21.0, 31.0, 0.0, 0, 22000)),
            RawRecord::from(("31/01/2015", 27.0, 22.0, 32.0, 5.0, 1, 30000)),
            RawRecord::from(("01/02/2015", 24.0, 19.0, 29.0, 20.0, 1, 26000)),
            RawRecord::from(("02/02/2015", 21.0, 17.0, 25.0, 40.0, 0, 16000)),
        ];
        FeaturePipeline::default().transform(&rows).unwrap()
    }

    #[test]
    fn test_totals() {
        let table = table();
        assert_eq!(StatsCalculator::total_consumption(&table), 114000);
        assert_eq!(
            StatsCalculator::totals_by_month(&table),
            vec![("Jan", 72000), ("Fev", 42000)]
        );
    }

    #[test]
    fn test_month_weekend_split() {
        let split = StatsCalculator::totals_by_month_and_weekend(&table());
        assert_eq!(
            split,
            vec![
                MonthSplit {
                    month: "Jan",
                    weekday_total: 42000,
                    weekend_total: 30000
                },
                MonthSplit {
                    month: "Fev",
                    weekday_total: 16000,
                    weekend_total: 26000
                },
            ]
        );
        assert_eq!(split[0].total(), 72000);
    }

    #[test]
    fn test_weekday_totals_are_monday_first() {
        let table = table();
        assert_eq!(
            StatsCalculator::totals_by_weekday(&table, "Jan"),
            vec![("Qui", 20000), ("Sex", 22000), ("Sáb", 30000)]
        );
        assert_eq!(
            StatsCalculator::totals_by_weekday(&table, "Fev"),
            vec![("Seg", 16000), ("Dom", 26000)]
        );
        assert!(StatsCalculator::totals_by_weekday(&table, "Mar").is_empty());
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = StatsCalculator::compute_descriptive_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.total, 40.0);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.median - 4.5).abs() < 1e-12);
        assert!((stats.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);

        let empty = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan());

        let single = StatsCalculator::compute_descriptive_stats(&[3.0]);
        assert_eq!(single.std, 0.0);
    }

    #[test]
    fn test_monthly_stats_order() {
        let stats = StatsCalculator::monthly_stats_parallel(&table());
        let labels: Vec<&str> = stats.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Fev"]);
        assert_eq!(stats[0].count, 3);
        assert!((stats[0].mean - 24000.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((StatsCalculator::pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((StatsCalculator::pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(StatsCalculator::pearson(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(StatsCalculator::pearson(&[1.0], &[1.0]), None);
        assert_eq!(StatsCalculator::pearson(&xs, &up[..3]), None);
    }

    #[test]
    fn test_consumption_correlation_signs() {
        let table = table();
        let temp = StatsCalculator::consumption_correlation(&table, |r| r.temp_max).unwrap();
        let rain = StatsCalculator::consumption_correlation(&table, |r| r.rainfall).unwrap();
        assert!(temp > 0.0);
        assert!(rain < 0.0);
    }
}
