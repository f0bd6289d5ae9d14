//! Static Chart Renderer
//! Writes a PNG report of the dataset with plotters.
//!
//! Layout:
//! 1. Top: daily consumption line over the whole period
//! 2. Bottom: monthly totals, weekday and weekend bars side by side

use crate::data::EnrichedTable;
use crate::stats::StatsCalculator;
use anyhow::{bail, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const LINE: RGBColor = RGBColor(91, 155, 213);
const WEEKDAY: RGBColor = RGBColor(237, 125, 49);
const WEEKEND: RGBColor = RGBColor(91, 155, 213);

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the report to `path` (PNG).
    pub fn render_report(table: &EnrichedTable, path: &Path, width: u32, height: u32) -> Result<()> {
        if table.is_empty() {
            bail!("no data to render");
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (top, bottom) = root.split_vertically((height / 2) as i32);

        Self::draw_line(&top, table)?;
        Self::draw_months(&bottom, table)?;

        root.present()?;
        info!(path = %path.display(), "report rendered");
        Ok(())
    }

    fn draw_line(area: &DrawingArea<BitMapBackend<'_>, Shift>, table: &EnrichedTable) -> Result<()> {
        let records = table.records();
        let max = records
            .iter()
            .map(|r| r.consumption)
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let n = records.len();

        let mut chart = ChartBuilder::on(area)
            .caption("Consumo diário (litros)", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..(n.max(2) - 1) as f64, 0f64..max * 1.1)?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|x| {
                records
                    .get(x.round() as usize)
                    .map(|r| r.date.format("%d/%m").to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y| crate::format::format_int(y.round() as i64))
            .draw()?;

        chart.draw_series(LineSeries::new(
            records
                .iter()
                .enumerate()
                .map(|(i, r)| (i as f64, r.consumption as f64)),
            &LINE,
        ))?;
        Ok(())
    }

    fn draw_months(area: &DrawingArea<BitMapBackend<'_>, Shift>, table: &EnrichedTable) -> Result<()> {
        let splits = StatsCalculator::totals_by_month_and_weekend(table);
        let max = splits
            .iter()
            .map(|s| s.weekday_total.max(s.weekend_total))
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let labels = table.labels().weekend;

        let mut chart = ChartBuilder::on(area)
            .caption("Consumo por mês", ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..splits.len() as f64, 0f64..max * 1.1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(splits.len() * 2 + 1)
            .x_label_formatter(&|x| {
                // labels sit at bar-group centres
                let centre = x - 0.5;
                if (centre - centre.round()).abs() > 1e-6 || centre < 0.0 {
                    return String::new();
                }
                splits
                    .get(centre.round() as usize)
                    .map(|s| s.month.to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y| crate::format::format_int(y.round() as i64))
            .draw()?;

        chart
            .draw_series(splits.iter().enumerate().map(|(i, s)| {
                let x = i as f64;
                Rectangle::new([(x + 0.1, 0.0), (x + 0.5, s.weekday_total as f64)], WEEKDAY.filled())
            }))?
            .label(labels[0])
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], WEEKDAY.filled()));

        chart
            .draw_series(splits.iter().enumerate().map(|(i, s)| {
                let x = i as f64;
                Rectangle::new([(x + 0.5, 0.0), (x + 0.9, s.weekend_total as f64)], WEEKEND.filled())
            }))?
            .label(labels[1])
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], WEEKEND.filled()));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeaturePipeline, RawRecord};

    fn table() -> EnrichedTable {
        let rows: Vec<RawRecord> = [
            ("30/01/2015", 0, 25461),
            ("31/01/2015", 1, 28972),
            ("01/02/2015", 1, 30814),
            ("02/02/2015", 0, 21000),
        ]
        .iter()
        .map(|&(date, weekend, litres)| {
            RawRecord::from((date, 25.0, 20.0, 30.0, 1.5, weekend, litres))
        })
        .collect();
        FeaturePipeline::default().transform(&rows).unwrap()
    }

    #[test]
    fn test_render_report_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.png");

        StaticChartRenderer::render_report(&table(), &path, 800, 600).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let empty = FeaturePipeline::default().transform(&[]).unwrap();

        assert!(StaticChartRenderer::render_report(&empty, &path, 800, 600).is_err());
        assert!(!path.exists());
    }
}
