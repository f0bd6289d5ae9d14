//! Dashboard Summary
//! Loads the dataset, derives features and gathers today/tomorrow weather
//! and predictions for the cards.

use crate::config::DashboardConfig;
use crate::data::{CalendarLabels, DataLoader, EnrichedTable, FeaturePipeline, OrderPolicy};
use crate::forecast::{DailyWeather, LinearModel, WeatherSource};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Weather and prediction for one day; either may be unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub weather: Option<DailyWeather>,
    pub predicted_litres: Option<f64>,
}

/// Recorded sales on the reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualSales {
    pub date: NaiveDate,
    pub consumption: i64,
    pub pct_delta: Option<f64>,
}

impl ActualSales {
    /// Sales grew against the previous row.
    pub fn is_up(&self) -> bool {
        self.pct_delta.is_some_and(|p| p > 0.0)
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub table: EnrichedTable,
    pub today: DayForecast,
    pub tomorrow: DayForecast,
    pub actual: Option<ActualSales>,
}

impl DashboardSummary {
    /// Build the summary. Dataset and pipeline failures are fatal; weather
    /// and model failures leave the affected values empty.
    pub fn assemble(
        config: &DashboardConfig,
        weather: &dyn WeatherSource,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<Self> {
        progress(10.0, "Reading dataset...");
        let mut loader = DataLoader::new();
        let rows = loader
            .load_csv(&config.dataset_path)
            .with_context(|| format!("loading {}", config.dataset_path.display()))?;

        progress(30.0, "Deriving features...");
        let pipeline = FeaturePipeline::new(
            CalendarLabels::for_locale(config.locale),
            OrderPolicy::from_require_sorted(config.require_sorted),
        );
        let table = pipeline.transform(rows).context("transforming dataset")?;

        progress(50.0, "Loading model...");
        let model = LinearModel::load(&config.model_path)
            .map_err(|e| warn!(path = %config.model_path.display(), error = %e, "model unavailable"))
            .ok();

        let today = config.reference_day();
        let tomorrow = today.succ_opt().unwrap_or(today);

        progress(60.0, "Fetching weather...");
        let today = Self::forecast_day(today, weather, model.as_ref());
        progress(80.0, "Fetching weather...");
        let tomorrow = Self::forecast_day(tomorrow, weather, model.as_ref());

        let actual = table.get_date(today.date).map(|r| ActualSales {
            date: r.date,
            consumption: r.consumption,
            pct_delta: r.consumption_pct_delta,
        });
        if actual.is_none() {
            warn!(date = %today.date, "reference date not in dataset");
        }

        info!(rows = table.len(), "dashboard summary ready");
        Ok(Self {
            table,
            today,
            tomorrow,
            actual,
        })
    }

    fn forecast_day(
        date: NaiveDate,
        source: &dyn WeatherSource,
        model: Option<&LinearModel>,
    ) -> DayForecast {
        let weather = source
            .daily(date)
            .map_err(|e| warn!(%date, error = %e, "weather unavailable"))
            .ok();
        let predicted_litres = match (&weather, model) {
            (Some(w), Some(m)) => Some(m.predict(w.temp_max, w.precip_max, date)),
            _ => None,
        };
        DayForecast {
            date,
            weather,
            predicted_litres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::WeatherError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct FixedWeather;

    impl WeatherSource for FixedWeather {
        fn daily(&self, date: NaiveDate) -> Result<DailyWeather, WeatherError> {
            Ok(DailyWeather {
                city: "campo grande".to_string(),
                date,
                temp_min: 20.0,
                temp_max: 30.0,
                precip_max: 10.0,
            })
        }
    }

    struct NoWeather;

    impl WeatherSource for NoWeather {
        fn daily(&self, _date: NaiveDate) -> Result<DailyWeather, WeatherError> {
            Err(WeatherError::Status(503))
        }
    }

    fn dataset() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "Data;Media;Minima;Maxima;Chuva;FDS;Consumo\n\
             30/12/2015;24,0;20,0;29,0;0;0;25.000\n\
             31/12/2015;25,0;21,0;30,0;0;0;30.000\n"
        )
        .unwrap();
        file
    }

    fn model() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"intercept": 5000.0, "coefficients": [650.0, -60.0, 5200.0]}}"#).unwrap();
        file
    }

    fn config(dataset: &NamedTempFile, model: &NamedTempFile) -> DashboardConfig {
        DashboardConfig {
            dataset_path: dataset.path().to_path_buf(),
            model_path: model.path().to_path_buf(),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn test_assemble_full() {
        let (dataset, model) = (dataset(), model());
        let mut steps = Vec::new();
        let summary = DashboardSummary::assemble(&config(&dataset, &model), &FixedWeather, &mut |p, _| {
            steps.push(p)
        })
        .unwrap();

        assert!(steps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(summary.table.len(), 2);

        // 31/12/2015 Thursday, 01/01/2016 Friday
        assert_eq!(summary.today.date, NaiveDate::from_ymd_opt(2015, 12, 31).unwrap());
        assert_eq!(summary.tomorrow.date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(summary.today.predicted_litres, Some(23900.0));

        let actual = summary.actual.unwrap();
        assert_eq!(actual.consumption, 30000);
        assert_eq!(actual.pct_delta, Some(0.2));
        assert!(actual.is_up());
    }

    #[test]
    fn test_weather_and_model_failures_are_not_fatal() {
        let dataset = dataset();
        let config = DashboardConfig {
            dataset_path: dataset.path().to_path_buf(),
            model_path: "/nonexistent/model.json".into(),
            ..DashboardConfig::default()
        };
        let summary = DashboardSummary::assemble(&config, &NoWeather, &mut |_, _| {}).unwrap();
        assert!(summary.today.weather.is_none());
        assert!(summary.tomorrow.predicted_litres.is_none());
        assert!(summary.actual.is_some());
    }

    #[test]
    fn test_missing_dataset_is_fatal() {
        let model = model();
        let config = DashboardConfig {
            dataset_path: "/nonexistent/data.csv".into(),
            model_path: model.path().to_path_buf(),
            ..DashboardConfig::default()
        };
        let err = DashboardSummary::assemble(&config, &FixedWeather, &mut |_, _| {}).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.csv"));
    }
}
