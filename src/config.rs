//! Dashboard configuration, read from JSON with a default for every field.

use crate::data::{parse_day_first, Locale};
use crate::forecast::WeatherConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "BEER_DASH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Day shown as "today", day-first
    #[serde(default = "default_reference_date")]
    pub reference_date: String,

    #[serde(default)]
    pub locale: Locale,

    /// Reject datasets whose rows are not in ascending date order
    #[serde(default = "default_require_sorted")]
    pub require_sorted: bool,

    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default)]
    pub weather: WeatherConfig,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("dataset/Consumo_cerveja.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/model.json")
}

fn default_reference_date() -> String {
    "31/12/2015".to_string()
}

const fn default_require_sorted() -> bool {
    true
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            model_path: default_model_path(),
            reference_date: default_reference_date(),
            locale: Locale::default(),
            require_sorted: default_require_sorted(),
            export_dir: default_export_dir(),
            weather: WeatherConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$BEER_DASH_CONFIG`, else `dashboard.json` if present, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    fn resolve(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading config");
            return Self::from_file(&path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            info!(path = %default_path.display(), "loading config");
            Self::from_file(default_path)
        } else {
            info!("no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parsed reference date; an unparseable value falls back to the default.
    pub fn reference_day(&self) -> NaiveDate {
        parse_day_first(&self.reference_date).unwrap_or_else(|| {
            warn!(value = %self.reference_date, "invalid reference_date, using default");
            NaiveDate::from_ymd_opt(2015, 12, 31).unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert!(config.require_sorted);
        assert_eq!(config.locale, Locale::PtBr);
        assert_eq!(
            config.reference_day(),
            NaiveDate::from_ymd_opt(2015, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "dataset_path": "/data/beer.csv",
                "reference_date": "15/06/2015",
                "locale": "en",
                "require_sorted": false,
                "weather": {{ "city": "cuiaba" }}
            }}"#
        )
        .unwrap();

        let config = DashboardConfig::resolve(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("/data/beer.csv"));
        assert_eq!(config.model_path, default_model_path());
        assert_eq!(config.locale, Locale::En);
        assert!(!config.require_sorted);
        assert_eq!(config.weather.city, "cuiaba");
        assert_eq!(config.weather.timeout_secs, 30);
        assert_eq!(
            config.reference_day(),
            NaiveDate::from_ymd_opt(2015, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_invalid_reference_date_falls_back() {
        let config = DashboardConfig {
            reference_date: "someday".to_string(),
            ..DashboardConfig::default()
        };
        assert_eq!(
            config.reference_day(),
            NaiveDate::from_ymd_opt(2015, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_errors_name_the_file() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/dashboard.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/dashboard.json"));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
