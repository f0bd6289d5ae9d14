//! INMET weather client
//!
//! Blocking HTTP client for the INMET capital-city conditions endpoint.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Weather service answered with a non-success status
    #[error("Weather service returned status {0}")]
    Status(u16),

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested city is not in the response
    #[error("No reading for city {0:?}")]
    CityNotFound(String),

    /// A reading is missing or not numeric
    #[error("Invalid {field} value {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// Weather service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// INMET endpoint; the date is appended as the last path segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Capital city to report (case-insensitive)
    #[serde(default = "default_city")]
    pub city: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://apitempo.inmet.gov.br/condicao/capitais".to_string()
}

fn default_city() -> String {
    "campo grande".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            city: default_city(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Daily extremes for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub city: String,
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Maximum precipitation, mm
    pub precip_max: f64,
}

/// Source of daily weather readings
pub trait WeatherSource: Send + Sync {
    fn daily(&self, date: NaiveDate) -> Result<DailyWeather, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct CapitalReading {
    #[serde(rename = "CAPITAL")]
    capital: String,
    #[serde(rename = "TMIN18", default)]
    tmin: Option<String>,
    #[serde(rename = "TMAX18", default)]
    tmax: Option<String>,
    #[serde(rename = "PMAX12", default)]
    pmax: Option<String>,
}

/// Readings may carry a trailing `*` marking estimated values.
fn reading_value(field: &'static str, raw: Option<&str>) -> Result<f64, WeatherError> {
    let raw = raw.unwrap_or_default();
    raw.replace('*', "")
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| WeatherError::InvalidValue {
            field,
            value: raw.to_string(),
        })
}

/// Pick one city's reading out of an INMET capitals response body.
pub fn parse_capitals(
    body: &str,
    city: &str,
    date: NaiveDate,
) -> Result<DailyWeather, WeatherError> {
    let readings: Vec<CapitalReading> = serde_json::from_str(body)?;
    let wanted = city.trim().to_uppercase();

    let reading = readings
        .iter()
        .find(|r| r.capital.trim().to_uppercase() == wanted)
        .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))?;

    Ok(DailyWeather {
        city: reading.capital.trim().to_lowercase(),
        date,
        temp_min: reading_value("TMIN18", reading.tmin.as_deref())?,
        temp_max: reading_value("TMAX18", reading.tmax.as_deref())?,
        precip_max: reading_value("PMAX12", reading.pmax.as_deref())?,
    })
}

/// INMET HTTP client implementation
#[derive(Debug)]
pub struct InmetClient {
    client: Client,
    config: WeatherConfig,
}

impl InmetClient {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            date.format("%Y-%m-%d")
        )
    }
}

impl WeatherSource for InmetClient {
    #[instrument(skip(self), fields(city = %self.config.city))]
    fn daily(&self, date: NaiveDate) -> Result<DailyWeather, WeatherError> {
        let url = self.url(date);
        debug!(%url, "fetching weather");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_capitals(&body, &self.config.city, date)
    }
}
