//! Dataset Loader Module
//! Reads the `;`-separated consumption dataset into raw records using Polars.

use crate::data::record::RawRecord;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Storage column order
const COLUMNS: [&str; 7] = [
    "date",
    "temp_avg",
    "temp_min",
    "temp_max",
    "rainfall",
    "is_weekend_raw",
    "consumption",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("Line {line}: missing {column}")]
    MissingValue { line: usize, column: &'static str },
    #[error("Line {line}: invalid {column} value {value:?}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("No data loaded")]
    NoData,
}

/// Parse a float written with either a decimal comma (`27,3`) or point.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.contains(',') {
        value.replace('.', "").replace(',', ".").parse().ok()
    } else {
        value.parse().ok()
    }
}

/// Parse litres written with dot thousands separators (`25.461`).
///
/// A `.` is only a thousands separator when every group after it has
/// exactly three digits; `28.9` is rejected.
pub fn parse_litres(value: &str) -> Option<i64> {
    let value = value.trim();
    let (int_part, frac_part) = match value.split_once(',') {
        Some((i, f)) => (i, Some(f)),
        None => (value, None),
    };

    let mut groups = int_part.split('.');
    let head = groups.next()?;
    let tail: Vec<&str> = groups.collect();
    if !tail.is_empty() {
        let head_digits = head.trim_start_matches('-');
        if !(1..=3).contains(&head_digits.len()) || tail.iter().any(|g| g.len() != 3) {
            return None;
        }
    }

    let digits = int_part.replace('.', "");
    match frac_part {
        Some(frac) => {
            let float: f64 = format!("{digits}.{frac}").parse().ok()?;
            Some(float.round() as i64)
        }
        None => digits.parse().ok(),
    }
}

/// Handles dataset loading; rows keep file order.
pub struct DataLoader {
    records: Option<Vec<RawRecord>>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            records: None,
            file_path: None,
        }
    }

    /// Load the dataset, replacing anything loaded before.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&[RawRecord], LoaderError> {
        self.file_path = Some(file_path.to_path_buf());

        // Everything as strings: the numbers use Brazilian formatting
        let df = LazyCsvReader::new(file_path)
            .with_separator(b';')
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        debug!(rows = df.height(), columns = df.width(), "csv read");

        let records = Self::records_from_frame(&df)?;
        info!(
            path = %file_path.display(),
            rows = records.len(),
            "dataset loaded"
        );

        self.records = Some(records);
        self.records.as_deref().ok_or(LoaderError::NoData)
    }

    /// Convert a string-typed frame in storage column order.
    pub fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>, LoaderError> {
        if df.width() < COLUMNS.len() {
            return Err(LoaderError::ColumnCount {
                expected: COLUMNS.len(),
                found: df.width(),
            });
        }

        let columns: Vec<Column> = df.get_columns()[..COLUMNS.len()]
            .iter()
            .map(|c| c.cast(&DataType::String))
            .collect::<PolarsResult<_>>()?;
        let cells: Vec<&StringChunked> = columns
            .iter()
            .map(|c| c.str())
            .collect::<PolarsResult<_>>()?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            // header is line 1
            let line = i + 2;
            let row: Vec<Option<&str>> = cells
                .iter()
                .map(|ca| ca.get(i).map(str::trim).filter(|s| !s.is_empty()))
                .collect();

            if row.iter().all(Option::is_none) {
                continue;
            }

            let text = |idx: usize| row[idx].ok_or(LoaderError::MissingValue {
                line,
                column: COLUMNS[idx],
            });
            let invalid = |idx: usize, value: &str| LoaderError::InvalidNumber {
                line,
                column: COLUMNS[idx],
                value: value.to_string(),
            };
            let decimal = |idx: usize| -> Result<f64, LoaderError> {
                let value = text(idx)?;
                parse_decimal(value).ok_or_else(|| invalid(idx, value))
            };

            let flag = text(5)?;
            let litres = text(6)?;

            records.push(RawRecord {
                date: text(0)?.to_string(),
                temp_avg: decimal(1)?,
                temp_min: decimal(2)?,
                temp_max: decimal(3)?,
                rainfall: decimal(4)?,
                is_weekend_raw: flag.parse().map_err(|_| invalid(5, flag))?,
                consumption: parse_litres(litres).ok_or_else(|| invalid(6, litres))?,
            });
        }

        Ok(records)
    }

    /// Get the number of loaded rows.
    pub fn get_row_count(&self) -> usize {
        self.records.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Get the loaded rows.
    pub fn get_records(&self) -> Option<&[RawRecord]> {
        self.records.as_deref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Data;Temperatura Media (C);Temperatura Minima (C);Temperatura Maxima (C);Precipitacao (mm);Final de Semana;Consumo de cerveja (litros)\n";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_decimal("27,3"), Some(27.3));
        assert_eq!(parse_decimal("27.3"), Some(27.3));
        assert_eq!(parse_decimal(" 0 "), Some(0.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_litres("25.461"), Some(25461));
        assert_eq!(parse_litres("28972"), Some(28972));
        assert_eq!(parse_litres("1.234,6"), Some(1235));
        assert_eq!(parse_litres("x"), None);
        assert_eq!(parse_litres("1.234.567"), Some(1234567));
        assert_eq!(parse_litres("28.9"), None);
        assert_eq!(parse_litres("25.46"), None);
        assert_eq!(parse_litres("1.2.3"), None);
        assert_eq!(parse_litres("2546.100"), None);
    }

    #[test]
    fn test_load_brazilian_csv() {
        let file = write_csv(
            "2015-01-01;27,3;23,9;32,5;0;0;25.461\n\
             2015-01-02;27,02;24,5;33,5;0;0;28.972\n\
             ;;;;;;\n\
             ;;;;;;\n",
        );
        let mut loader = DataLoader::new();
        let records = loader.load_csv(file.path()).unwrap().to_vec();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            RawRecord::from(("2015-01-01", 27.3, 23.9, 32.5, 0.0, 0, 25461))
        );
        assert_eq!(records[1].consumption, 28972);
        assert_eq!(records[1].temp_avg, 27.02);
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(loader.get_file_path().map(|p| p.as_path()), Some(file.path()));
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let file = write_csv("01/01/2015;27,3;23,9;32,5;0;0;25.461\n02/01/2015;quente;24,5;33,5;0;0;28.972\n");
        let err = DataLoader::new().load_csv(file.path()).unwrap_err();
        match err {
            LoaderError::InvalidNumber { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "temp_avg");
                assert_eq!(value, "quente");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_short_thousands_group_is_rejected() {
        let file = write_csv("01/01/2015;27,3;23,9;32,5;0;0;28.9\n");
        let err = DataLoader::new().load_csv(file.path()).unwrap_err();
        match err {
            LoaderError::InvalidNumber { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "consumption");
                assert_eq!(value, "28.9");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_value() {
        let file = write_csv("01/01/2015;27,3;23,9;32,5;0;;25.461\n");
        let err = DataLoader::new().load_csv(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingValue {
                line: 2,
                column: "is_weekend_raw"
            }
        ));
    }

    #[test]
    fn test_too_few_columns() {
        let df = DataFrame::new(vec![Column::new("date".into(), vec!["01/01/2015"])]).unwrap();
        let err = DataLoader::records_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::ColumnCount {
                expected: 7,
                found: 1
            }
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut loader = DataLoader::new();
        assert!(loader
            .load_csv(Path::new("/nonexistent/Consumo_cerveja.csv"))
            .is_err());
        assert!(loader.get_records().is_none());
    }
}
