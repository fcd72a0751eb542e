//! Static Chart Renderer
//! Renders the dashboard charts to PNG files with plotters.
//!
//! Layout matches the interactive charts:
//! 1. Monthly trend: one line per year, month names on the x axis
//! 2. Season totals: colored bars, largest first, value label above each bar
//! 3. Heatmap: weekday rows by hour columns on the YlGnBu scale

use super::model::{series_color, HeatmapGrid, MonthlyTrend, Rgb, SeasonTotals};
use crate::stats::format_value;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::Path;

const FONT: &str = "sans-serif";

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Label for a category axis where category `i` sits at `x = i`.
fn category_tick(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if idx >= 0.0 && (idx - x).abs() < 1e-6 {
        labels.get(idx as usize).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}

/// Label for a grid axis where cell `i` spans `[i, i + 1)`, named at its center.
///
/// `flipped` counts cells from the far end, for rows drawn top-down.
fn cell_tick(labels: &[String], x: f64, flipped: bool) -> String {
    let idx = (x - 0.5).round();
    if idx < 0.0 || (idx + 0.5 - x).abs() > 1e-6 || idx as usize >= labels.len() {
        return String::new();
    }
    let idx = idx as usize;
    let cell = if flipped { labels.len() - 1 - idx } else { idx };
    labels[cell].clone()
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    pub fn render_monthly_trend(
        trend: &MonthlyTrend,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = trend.categories.len().max(1);
        let y_max = (trend.max_value() * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption("Monthly Bike Rentals by Year", (FONT, 26).into_font())
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        let month_label = |x: &f64| category_tick(&trend.categories, *x);

        chart
            .configure_mesh()
            .x_labels(n)
            .x_label_formatter(&month_label)
            .y_label_formatter(&|y: &f64| format!("{:.0}", y))
            .x_desc("Month")
            .y_desc("Total rentals")
            .draw()?;

        for (i, series) in trend.series.iter().enumerate() {
            let color = rgb(series_color(i));
            let points: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|p| (p.x as f64, p.value))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart.draw_series(
                points
                    .into_iter()
                    .map(|(x, y)| Circle::new((x, y), 4, color.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    pub fn render_season_totals(
        totals: &SeasonTotals,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = totals.bars.len().max(1);
        let y_max = (totals.max_value() * 1.15).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption("Total Bike Rentals by Season", (FONT, 26).into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

        let labels: Vec<String> = totals.bars.iter().map(|b| b.label.clone()).collect();
        let season_label = |x: &f64| category_tick(&labels, *x);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&season_label)
            .y_label_formatter(&|y: &f64| format!("{:.0}", y))
            .x_desc("Season")
            .y_desc("Total rentals")
            .draw()?;

        chart.draw_series(totals.bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, bar.total)], rgb(bar.color).filled())
        }))?;
        chart.draw_series(totals.bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, bar.total)], BLACK.stroke_width(1))
        }))?;

        let label_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(totals.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                format_value(bar.total),
                (i as f64, bar.total + y_max * 0.01),
                label_style.clone(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    pub fn render_heatmap(
        grid: &HeatmapGrid,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let rows = grid.row_labels.len().max(1);
        let cols = grid.col_labels.len().max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption("Bike Rentals by Weekday and Hour", (FONT, 26).into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(110)
            .build_cartesian_2d(0f64..cols as f64, 0f64..rows as f64)?;

        let col_label = |x: &f64| cell_tick(&grid.col_labels, *x, false);
        // First row is drawn at the top
        let row_label = |y: &f64| cell_tick(&grid.row_labels, *y, true);

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(cols * 2 + 1)
            .y_labels(rows * 2 + 1)
            .x_label_formatter(&col_label)
            .y_label_formatter(&row_label)
            .x_desc("Hour")
            .y_desc("Weekday")
            .draw()?;

        chart.draw_series(grid.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, value)| {
                let (x, y) = (c as f64, (rows - 1 - r) as f64);
                Rectangle::new(
                    [(x, y), (x + 1.0, y + 1.0)],
                    rgb(grid.cell_color(*value)).filled(),
                )
            })
        }))?;

        root.present()?;
        Ok(())
    }
}
