//! Chart Plotter Module
//! Creates interactive consumption charts using egui_plot.

use crate::data::{EnrichedRecord, EnrichedTable, WeekendFlag};
use crate::format::{format_float, format_int};
use crate::stats::MonthSplit;
use chrono::{Datelike, NaiveDate};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

/// Series colors
pub const LINE_COLOR: Color32 = Color32::from_rgb(128, 177, 211);
pub const WEEKDAY_COLOR: Color32 = Color32::from_rgb(251, 128, 114);
pub const WEEKEND_COLOR: Color32 = Color32::from_rgb(128, 177, 211);

pub const PALETTE: [Color32; 12] = [
    Color32::from_rgb(141, 211, 199),
    Color32::from_rgb(255, 255, 179),
    Color32::from_rgb(190, 186, 218),
    Color32::from_rgb(251, 128, 114),
    Color32::from_rgb(128, 177, 211),
    Color32::from_rgb(253, 180, 98),
    Color32::from_rgb(179, 222, 105),
    Color32::from_rgb(252, 205, 229),
    Color32::from_rgb(217, 217, 217),
    Color32::from_rgb(188, 128, 189),
    Color32::from_rgb(204, 235, 197),
    Color32::from_rgb(255, 237, 111),
];

const CHART_HEIGHT: f32 = 320.0;

/// Plot x coordinate for a date.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Share of each value in the total, as a fraction.
pub fn shares(values: &[(&'static str, i64)]) -> Vec<(&'static str, f64)> {
    let total: i64 = values.iter().map(|(_, v)| v).sum();
    values
        .iter()
        .map(|&(label, v)| {
            let share = if total == 0 { 0.0 } else { v as f64 / total as f64 };
            (label, share)
        })
        .collect()
}

/// Category label for a bar index.
fn category_formatter(labels: Vec<&'static str>) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
    }
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn weekend_color(flag: WeekendFlag) -> Color32 {
        match flag {
            WeekendFlag::Weekday => WEEKDAY_COLOR,
            WeekendFlag::Weekend => WEEKEND_COLOR,
        }
    }

    /// Daily consumption across the whole table
    pub fn draw_consumption_line(ui: &mut egui::Ui, table: &EnrichedTable) {
        let points: PlotPoints = table
            .iter()
            .map(|r| [date_to_x(r.date), r.consumption as f64])
            .collect();

        Plot::new("consumption_line")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Data")
            .y_axis_label("Litros")
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%d/%m").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|_name, value| {
                let date = x_to_date(value.x)
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_default();
                format!("{}\n{} L", date, format_int(value.y.round() as i64))
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(LINE_COLOR)
                        .width(1.5)
                        .name("Consumo"),
                );
            });
    }

    /// One bar per category, labelled with its share of the total.
    pub fn draw_share_bars(ui: &mut egui::Ui, id: &str, totals: &[(&'static str, i64)]) {
        let labels: Vec<&'static str> = totals.iter().map(|(l, _)| *l).collect();
        let bars: Vec<Bar> = totals
            .iter()
            .zip(shares(totals))
            .enumerate()
            .map(|(i, (&(label, value), (_, share)))| {
                Bar::new(i as f64, value as f64)
                    .name(format!("{} {}%", label, format_float(share * 100.0, 1)))
                    .fill(PALETTE[i % PALETTE.len()])
                    .width(0.7)
            })
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Litros")
            .x_axis_formatter(category_formatter(labels))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Monthly consumption stacked by weekend category
    pub fn draw_month_weekend_bars(
        ui: &mut egui::Ui,
        splits: &[MonthSplit],
        weekend_labels: [&'static str; 2],
    ) {
        let labels: Vec<&'static str> = splits.iter().map(|s| s.month).collect();
        let weekday: Vec<Bar> = splits
            .iter()
            .enumerate()
            .map(|(i, s)| Bar::new(i as f64, s.weekday_total as f64).width(0.7))
            .collect();
        let weekend: Vec<Bar> = splits
            .iter()
            .enumerate()
            .map(|(i, s)| Bar::new(i as f64, s.weekend_total as f64).width(0.7))
            .collect();

        let weekday_chart = BarChart::new(weekday)
            .color(WEEKDAY_COLOR)
            .name(weekend_labels[0]);
        let weekend_chart = BarChart::new(weekend)
            .color(WEEKEND_COLOR)
            .name(weekend_labels[1])
            .stack_on(&[&weekday_chart]);

        Plot::new("month_weekend_bars")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_label("Litros")
            .x_axis_formatter(category_formatter(labels))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(weekday_chart);
                plot_ui.bar_chart(weekend_chart);
            });
    }

    /// Consumption against a weather reading, one series per weekend category
    pub fn draw_scatter<F>(
        ui: &mut egui::Ui,
        id: &str,
        table: &EnrichedTable,
        x_label: &str,
        field: F,
    ) where
        F: Fn(&EnrichedRecord) -> f64,
    {
        let series = |flag: WeekendFlag| -> PlotPoints {
            table
                .iter()
                .filter(|r| r.is_weekend == flag)
                .map(|r| [field(r), r.consumption as f64])
                .collect()
        };
        let weekday = series(WeekendFlag::Weekday);
        let weekend = series(WeekendFlag::Weekend);
        let labels = table.labels().weekend;

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(x_label.to_string())
            .y_axis_label("Litros")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(weekday)
                        .radius(3.0)
                        .color(Self::weekend_color(WeekendFlag::Weekday))
                        .name(labels[0]),
                );
                plot_ui.points(
                    Points::new(weekend)
                        .radius(3.0)
                        .color(Self::weekend_color(WeekendFlag::Weekend))
                        .name(labels[1]),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_round_trip() {
        let date = NaiveDate::from_ymd_opt(2015, 12, 31).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(date_to_x(date) + 0.4), Some(date));
    }

    #[test]
    fn test_shares() {
        let s = shares(&[("Jan", 300), ("Fev", 100)]);
        assert_eq!(s, vec![("Jan", 0.75), ("Fev", 0.25)]);
        assert_eq!(shares(&[("Jan", 0)]), vec![("Jan", 0.0)]);
        assert!(shares(&[]).is_empty());
    }
}
