//! Beer Dashboard - Consumption Analysis & Forecast Viewer
//!
//! Loads daily beer consumption with weather readings, derives calendar
//! features and shows them next to a weather-driven sales forecast.

use beer_dash::gui::BeerDashApp;
use beer_dash::DashboardConfig;
use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let config = DashboardConfig::load().unwrap_or_else(|e| {
        error!(error = %e, "invalid config, using defaults");
        DashboardConfig::default()
    });

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 900.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Dashboard Consumo de Cerveja"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Beer Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(BeerDashApp::new(cc, config)))),
    )
}
