//! Chart Viewer Widget
//! Central scrollable panel: summary cards on top, consumption charts below.

use crate::charts::ChartPlotter;
use crate::format::{format_float, format_int, format_pct};
use crate::stats::{ConsumptionStats, MonthSplit, StatsCalculator};
use crate::summary::{DashboardSummary, DayForecast};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 150.0;

const SUCCESS: Color32 = Color32::from_rgb(40, 167, 69);
const DANGER: Color32 = Color32::from_rgb(220, 53, 69);
const NEUTRAL: Color32 = Color32::from_rgb(200, 200, 200);

/// Aggregates computed once per load
struct ViewData {
    summary: DashboardSummary,
    total: i64,
    by_month: Vec<(&'static str, i64)>,
    month_splits: Vec<MonthSplit>,
    monthly_stats: Vec<ConsumptionStats>,
    temp_corr: Option<f64>,
    rain_corr: Option<f64>,
}

/// Scrollable dashboard area.
#[derive(Default)]
pub struct ChartViewer {
    data: Option<ViewData>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.data.as_ref().map(|d| &d.summary)
    }

    /// Set a freshly loaded summary and precompute aggregates.
    pub fn set_summary(&mut self, summary: DashboardSummary) {
        let table = &summary.table;
        let total = StatsCalculator::total_consumption(table);
        let by_month = StatsCalculator::totals_by_month(table);
        let month_splits = StatsCalculator::totals_by_month_and_weekend(table);
        let monthly_stats = StatsCalculator::monthly_stats_parallel(table);
        let temp_corr = StatsCalculator::consumption_correlation(table, |r| r.temp_max);
        let rain_corr = StatsCalculator::consumption_correlation(table, |r| r.rainfall);

        self.data = Some(ViewData {
            summary,
            total,
            by_month,
            month_splits,
            monthly_stats,
            temp_corr,
            rain_corr,
        });
    }

    /// Draw cards and charts
    pub fn show(&mut self, ui: &mut egui::Ui, selected_month: &str) {
        let Some(data) = &self.data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("Dashboard Consumo de Cerveja")
                        .size(22.0)
                        .strong(),
                );
                if let (Some(first), Some(last)) =
                    (data.summary.table.first_date(), data.summary.table.last_date())
                {
                    ui.label(
                        RichText::new(format!(
                            "Período: {} a {}",
                            first.format("%d/%m/%Y"),
                            last.format("%d/%m/%Y")
                        ))
                        .color(Color32::GRAY),
                    );
                }
                ui.add_space(CHART_SPACING);

                Self::draw_cards(ui, &data.summary);
                ui.add_space(CHART_SPACING);

                let table = &data.summary.table;
                let half = (ui.available_width() - CHART_SPACING) / 2.0;

                ui.horizontal(|ui| {
                    Self::card(ui, half * 1.3, "Consumo diário", NEUTRAL, |ui| {
                        ChartPlotter::draw_consumption_line(ui, table);
                    });
                    Self::card(ui, half * 0.7 - CHART_SPACING, "Total por mês", NEUTRAL, |ui| {
                        ui.label(format!("Total: {} L", format_int(data.total)));
                        ChartPlotter::draw_share_bars(ui, "month_share", &data.by_month);
                    });
                });
                ui.add_space(CHART_SPACING);

                ui.horizontal(|ui| {
                    Self::card(ui, half * 1.3, "Consumo por mês", NEUTRAL, |ui| {
                        ChartPlotter::draw_month_weekend_bars(
                            ui,
                            &data.month_splits,
                            table.labels().weekend,
                        );
                    });
                    let title = format!("Dias da semana: {selected_month}");
                    Self::card(ui, half * 0.7 - CHART_SPACING, &title, NEUTRAL, |ui| {
                        let by_weekday = StatsCalculator::totals_by_weekday(table, selected_month);
                        let month_total: i64 = by_weekday.iter().map(|(_, v)| v).sum();
                        ui.label(format!("Total: {} L", format_int(month_total)));
                        ChartPlotter::draw_share_bars(ui, "weekday_share", &by_weekday);
                    });
                });
                ui.add_space(CHART_SPACING);

                ui.horizontal(|ui| {
                    let title = Self::corr_title("Temperatura máxima", data.temp_corr);
                    Self::card(ui, half, &title, NEUTRAL, |ui| {
                        ChartPlotter::draw_scatter(ui, "scatter_temp", table, "°C", |r| r.temp_max);
                    });
                    let title = Self::corr_title("Precipitação", data.rain_corr);
                    Self::card(ui, half, &title, NEUTRAL, |ui| {
                        ChartPlotter::draw_scatter(ui, "scatter_rain", table, "mm", |r| r.rainfall);
                    });
                });
                ui.add_space(CHART_SPACING);

                let width = ui.available_width();
                Self::card(ui, width, "Estatísticas por mês (litros/dia)", NEUTRAL, |ui| {
                    Self::draw_stats_grid(ui, &data.monthly_stats);
                });
            });
    }

    fn draw_stats_grid(ui: &mut egui::Ui, stats: &[ConsumptionStats]) {
        egui::Grid::new("monthly_stats")
            .striped(true)
            .num_columns(7)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                for header in ["Mês", "Dias", "Total", "Média", "Mediana", "Desvio", "Mín / Máx"] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for s in stats {
                    ui.label(&s.label);
                    ui.label(s.count.to_string());
                    ui.label(format_int(s.total.round() as i64));
                    ui.label(format_float(s.mean, 0));
                    ui.label(format_float(s.median, 0));
                    ui.label(format_float(s.std, 0));
                    ui.label(format!(
                        "{} / {}",
                        format_int(s.min.round() as i64),
                        format_int(s.max.round() as i64)
                    ));
                    ui.end_row();
                }
            });
    }

    fn corr_title(name: &str, corr: Option<f64>) -> String {
        match corr {
            Some(r) => format!("{name} x Consumo (r = {})", format_float(r, 2)),
            None => format!("{name} x Consumo"),
        }
    }

    /// Four summary cards in one row
    fn draw_cards(ui: &mut egui::Ui, summary: &DashboardSummary) {
        let width = (ui.available_width() - 3.0 * CHART_SPACING) / 4.0;
        let (today, tomorrow) = (&summary.today, &summary.tomorrow);

        ui.horizontal(|ui| {
            Self::card(ui, width, "Temperatura", NEUTRAL, |ui| {
                for (label, day) in [("Hoje", today), ("Amanhã", tomorrow)] {
                    Self::day_header(ui, label, day);
                    let text = day
                        .weather
                        .as_ref()
                        .map(|w| {
                            format!(
                                "Max: {}° Min: {}°",
                                format_float(w.temp_max, 1),
                                format_float(w.temp_min, 1)
                            )
                        })
                        .unwrap_or_else(|| "indisponível".to_string());
                    ui.label(RichText::new(text).size(18.0));
                }
            });

            Self::card(ui, width, "Precipitação", NEUTRAL, |ui| {
                for (label, day) in [("Hoje", today), ("Amanhã", tomorrow)] {
                    Self::day_header(ui, label, day);
                    let text = day
                        .weather
                        .as_ref()
                        .map(|w| format!("Max: {}mm", format_float(w.precip_max, 1)))
                        .unwrap_or_else(|| "indisponível".to_string());
                    ui.label(RichText::new(text).size(18.0));
                }
            });

            Self::card(ui, width, "Venda Esperada", NEUTRAL, |ui| {
                for (label, day) in [("Hoje", today), ("Amanhã", tomorrow)] {
                    Self::day_header(ui, label, day);
                    let text = day
                        .predicted_litres
                        .map(|l| format!("{} Litros", format_float(l, 2)))
                        .unwrap_or_else(|| "indisponível".to_string());
                    ui.label(RichText::new(text).size(18.0));
                }
            });

            let color = match &summary.actual {
                Some(actual) if actual.is_up() => SUCCESS,
                Some(_) => DANGER,
                None => NEUTRAL,
            };
            Self::card(ui, width, "Venda Realizada", color, |ui| match &summary.actual {
                Some(actual) => {
                    ui.label(format!("Hoje {}", actual.date.format("%d/%m")));
                    ui.label(
                        RichText::new(format!("{} Litros", format_int(actual.consumption)))
                            .size(18.0),
                    );
                    let pct = actual
                        .pct_delta
                        .map(format_pct)
                        .unwrap_or_else(|| "-".to_string());
                    ui.label(RichText::new(pct).size(18.0).color(color));
                    ui.label("Em relação a ontem");
                }
                None => {
                    ui.label(format!("Hoje {}", today.date.format("%d/%m")));
                    ui.label(RichText::new("sem registro").size(18.0));
                }
            });
        });
    }

    fn day_header(ui: &mut egui::Ui, label: &str, day: &DayForecast) {
        ui.label(
            RichText::new(format!("{} {}", label, day.date.format("%d/%m")))
                .size(12.0)
                .color(Color32::GRAY),
        );
    }

    /// Framed card with a header line
    fn card(
        ui: &mut egui::Ui,
        width: f32,
        title: &str,
        border_color: Color32,
        body: impl FnOnce(&mut egui::Ui),
    ) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(width.max(100.0) - 24.0);
                ui.set_min_height(CARD_HEIGHT - 24.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).size(15.0).strong());
                    ui.add_space(6.0);
                    body(ui);
                });
            });
    }
}
