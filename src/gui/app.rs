//! Beer Dashboard Main Application
//! Main window with control panel and dashboard viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::forecast::InmetClient;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::summary::DashboardSummary;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{error, info};

const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 1000;

/// Loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete(Box<DashboardSummary>),
    Error(String),
}

/// Main application window.
pub struct BeerDashApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl BeerDashApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(config.dataset_path.clone()),
            chart_viewer: ChartViewer::new(),
            config,
            load_rx: None,
            is_loading: false,
        };
        app.start_load();
        app
    }

    /// Load dataset, weather and predictions in a background thread
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_progress(5.0, "Loading...");

        let config = self.config.clone();
        thread::spawn(move || Self::run_load(tx, config));
    }

    /// Run loading (called from background thread)
    fn run_load(tx: Sender<LoadResult>, config: DashboardConfig) {
        let client = match InmetClient::new(config.weather.clone()) {
            Ok(client) => client,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let mut progress = |p: f32, status: &str| {
            let _ = tx.send(LoadResult::Progress(p, status.to_string()));
        };

        let result = match DashboardSummary::assemble(&config, &client, &mut progress) {
            Ok(summary) => LoadResult::Complete(Box::new(summary)),
            Err(e) => {
                error!(error = %format!("{e:#}"), "dashboard load failed");
                LoadResult::Error(format!("{e:#}"))
            }
        };
        let _ = tx.send(result);
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(LoadResult::Progress(progress, status)) => {
                    self.control_panel.set_progress(progress, &status);
                }
                Ok(LoadResult::Complete(summary)) => {
                    let rows = summary.table.len();
                    let months = summary
                        .table
                        .iter()
                        .map(|r| r.month_label)
                        .fold(Vec::new(), |mut acc, m| {
                            if !acc.contains(&m) {
                                acc.push(m);
                            }
                            acc
                        });
                    self.control_panel.update_months(months);
                    self.chart_viewer.set_summary(*summary);
                    self.control_panel
                        .set_progress(100.0, &format!("Complete! {} rows loaded", rows));
                    self.is_loading = false;
                    return;
                }
                Ok(LoadResult::Error(error)) => {
                    self.control_panel
                        .set_progress(0.0, &format!("Error: {}", error));
                    self.is_loading = false;
                    return;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("loader thread stopped without a result");
                    self.control_panel
                        .set_progress(0.0, "Error: loading stopped unexpectedly");
                    self.is_loading = false;
                    return;
                }
            }
        }

        // Still running
        self.load_rx = Some(rx);
    }

    /// Reload the current dataset unless a load is already running
    fn reload(&mut self) {
        if self.is_loading {
            return;
        }
        self.chart_viewer.clear();
        self.start_load();
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            info!(path = %path.display(), "dataset selected");
            self.chart_viewer.clear();
            self.control_panel.settings.csv_path = Some(path.clone());
            self.config.dataset_path = path;
            self.start_load();
        }
    }

    /// Handle PNG export - render the report and open it
    fn handle_export_png(&mut self) {
        let Some(summary) = self.chart_viewer.summary() else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        // Ask user for output location
        let output_path: PathBuf = match rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_directory(&self.config.export_dir)
            .set_file_name("consumo_cerveja.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match StaticChartRenderer::render_report(
            &summary.table,
            &output_path,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        ) {
            Ok(()) => {
                if let Err(e) = open::that(&output_path) {
                    error!(error = %e, "could not open exported report");
                }
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Exported {}", output_path.display()),
                );
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {:#}", e));
            }
        }
    }
}

impl eframe::App for BeerDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.reload(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        let selected_month = self.control_panel.settings.selected_month.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &selected_month);
        });
    }
}
