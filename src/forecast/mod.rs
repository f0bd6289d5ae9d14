//! Forecast module - next-day weather and consumption prediction

mod model;
mod weather;

pub use model::{LinearModel, ModelError};
pub use weather::{DailyWeather, InmetClient, WeatherConfig, WeatherError, WeatherSource};
