//! Consumption Model
//! Linear regression over (max temperature, precipitation, weekend) loaded
//! from a JSON coefficient file.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pre-trained linear regression, litres per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    /// Weights for [temp_max, precipitation, weekend]
    pub coefficients: [f64; 3],
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let model: LinearModel = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), ?model, "model loaded");
        Ok(model)
    }

    /// Weekend feature by calendar day: Saturday and Sunday.
    pub fn weekend_feature(date: NaiveDate) -> f64 {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => 1.0,
            _ => 0.0,
        }
    }

    pub fn predict(&self, temp_max: f64, precip: f64, date: NaiveDate) -> f64 {
        let features = [temp_max, precip, Self::weekend_feature(date)];
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn model() -> LinearModel {
        LinearModel {
            intercept: 5000.0,
            coefficients: [650.0, -60.0, 5200.0],
        }
    }

    #[test]
    fn test_weekend_feature() {
        // 2 Jan 2015 was a Friday
        let friday = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        assert_eq!(LinearModel::weekend_feature(friday), 0.0);
        assert_eq!(LinearModel::weekend_feature(friday.succ_opt().unwrap()), 1.0);
        assert_eq!(LinearModel::weekend_feature(NaiveDate::from_ymd_opt(2015, 1, 4).unwrap()), 1.0);
    }

    #[test]
    fn test_predict() {
        let friday = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2015, 1, 3).unwrap();
        let m = model();
        assert!((m.predict(30.0, 10.0, friday) - 23900.0).abs() < 1e-9);
        assert!((m.predict(30.0, 10.0, saturday) - 29100.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"intercept": 5000.0, "coefficients": [650.0, -60.0, 5200.0]}}"#).unwrap();
        assert_eq!(LinearModel::load(file.path()).unwrap(), model());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            LinearModel::load(Path::new("/nonexistent/model.json")),
            Err(ModelError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"intercept": 1.0, "coefficients": [1.0]}}"#).unwrap();
        assert!(matches!(
            LinearModel::load(file.path()),
            Err(ModelError::Parse(_))
        ));
    }
}
