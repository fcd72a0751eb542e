//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use super::model::{series_color, HeatmapGrid, MonthlyTrend, Rgb, SeasonTotals};
use crate::stats::{format_optional, format_value, AggregatedSummary, DescribeTable, MISSING};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

const CHART_HEIGHT: f32 = 360.0;
const HEATMAP_LABEL_WIDTH: f32 = 90.0;
const HEATMAP_CELL_HEIGHT: f32 = 28.0;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Category ticks at every integer position.
    fn category_marks(count: usize) -> Vec<GridMark> {
        (0..count)
            .map(|i| GridMark {
                value: i as f64,
                step_size: 1.0,
            })
            .collect()
    }

    /// Line chart of summed usage per month, one line per year.
    pub fn draw_trend_chart(ui: &mut egui::Ui, trend: &MonthlyTrend) {
        let categories = trend.categories.clone();
        let tick_count = categories.len();

        Plot::new("monthly_trend")
            .height(CHART_HEIGHT)
            .legend(Legend::default().position(egui_plot::Corner::LeftTop))
            .x_axis_label("Month")
            .y_axis_label("Total rentals")
            .allow_scroll(false)
            .include_y(0.0)
            .x_grid_spacer(move |_input| Self::category_marks(tick_count))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    categories
                        .get(idx as usize)
                        .map(|c| c.chars().take(3).collect())
                        .unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, series) in trend.series.iter().enumerate() {
                    let color = to_color32(series_color(i));
                    let points: Vec<[f64; 2]> = series
                        .points
                        .iter()
                        .map(|p| [p.x as f64, p.value])
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(&series.name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(4.0)
                            .color(color)
                            .name(&series.name),
                    );
                }
            });
    }

    /// Bar chart of total usage per season with value labels above each bar.
    pub fn draw_season_chart(ui: &mut egui::Ui, totals: &SeasonTotals) {
        let labels: Vec<String> = totals.bars.iter().map(|b| b.label.clone()).collect();
        let tick_count = labels.len();
        let label_offset = totals.max_value() * 0.02;

        Plot::new("season_totals")
            .height(CHART_HEIGHT)
            .x_axis_label("Season")
            .y_axis_label("Total rentals")
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(totals.max_value() * 1.1)
            .x_grid_spacer(move |_input| Self::category_marks(tick_count))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = totals
                    .bars
                    .iter()
                    .enumerate()
                    .map(|(i, bar)| {
                        Bar::new(i as f64, bar.total)
                            .width(0.6)
                            .fill(to_color32(bar.color))
                            .stroke(Stroke::new(1.0, Color32::BLACK))
                            .name(&bar.label)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name("Total rentals"));

                for (i, bar) in totals.bars.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, bar.total + label_offset),
                            RichText::new(format_value(bar.total)).size(13.0),
                        )
                        .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            });
    }

    /// Heatmap grid painted cell by cell, with hover readout and a color scale.
    pub fn draw_heatmap(ui: &mut egui::Ui, grid: &HeatmapGrid) {
        let rows = grid.row_labels.len();
        let cols = grid.col_labels.len();
        if rows == 0 || cols == 0 {
            ui.label(RichText::new("No data").color(Color32::GRAY));
            return;
        }

        let text_color = ui.visuals().text_color();
        let cell_w = ((ui.available_width() - HEATMAP_LABEL_WIDTH) / cols as f32).clamp(14.0, 48.0);
        let header_h = 20.0;
        let size = egui::vec2(
            HEATMAP_LABEL_WIDTH + cell_w * cols as f32,
            HEATMAP_CELL_HEIGHT * rows as f32 + header_h,
        );

        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let origin = response.rect.min;
        let font = FontId::proportional(12.0);

        for (r, row) in grid.cells.iter().enumerate() {
            let y = origin.y + r as f32 * HEATMAP_CELL_HEIGHT;
            painter.text(
                egui::pos2(origin.x + HEATMAP_LABEL_WIDTH - 8.0, y + HEATMAP_CELL_HEIGHT / 2.0),
                Align2::RIGHT_CENTER,
                &grid.row_labels[r],
                font.clone(),
                text_color,
            );

            for (c, value) in row.iter().enumerate() {
                let cell = egui::Rect::from_min_size(
                    egui::pos2(origin.x + HEATMAP_LABEL_WIDTH + c as f32 * cell_w, y),
                    egui::vec2(cell_w, HEATMAP_CELL_HEIGHT),
                );
                painter.rect_filled(cell, 0.0, to_color32(grid.cell_color(*value)));
            }
        }

        let label_y = origin.y + rows as f32 * HEATMAP_CELL_HEIGHT + header_h / 2.0;
        for (c, label) in grid.col_labels.iter().enumerate() {
            painter.text(
                egui::pos2(
                    origin.x + HEATMAP_LABEL_WIDTH + (c as f32 + 0.5) * cell_w,
                    label_y,
                ),
                Align2::CENTER_CENTER,
                label,
                font.clone(),
                text_color,
            );
        }

        if let Some(pos) = response.hover_pos() {
            let c = ((pos.x - origin.x - HEATMAP_LABEL_WIDTH) / cell_w).floor();
            let r = ((pos.y - origin.y) / HEATMAP_CELL_HEIGHT).floor();
            if c >= 0.0 && r >= 0.0 && (c as usize) < cols && (r as usize) < rows {
                let (r, c) = (r as usize, c as usize);
                let value = format_optional(grid.cells[r][c]);
                response.on_hover_text(format!(
                    "{}, hour {}: {}",
                    grid.row_labels[r], grid.col_labels[c], value
                ));
            }
        }

        ui.add_space(6.0);
        Self::draw_color_scale(ui, grid);
    }

    fn draw_color_scale(ui: &mut egui::Ui, grid: &HeatmapGrid) {
        let steps = 40;
        let width = 240.0;
        let (response, painter) = ui.allocate_painter(egui::vec2(width + 160.0, 18.0), Sense::hover());
        let origin = response.rect.min;
        let text_color = ui.visuals().text_color();

        painter.text(
            origin + egui::vec2(0.0, 9.0),
            Align2::LEFT_CENTER,
            format_value(grid.min),
            FontId::proportional(11.0),
            text_color,
        );
        let bar_x = origin.x + 70.0;
        for i in 0..steps {
            let t = i as f64 / (steps - 1) as f64;
            let rect = egui::Rect::from_min_size(
                egui::pos2(bar_x + i as f32 * width / steps as f32, origin.y + 2.0),
                egui::vec2(width / steps as f32 + 0.5, 14.0),
            );
            painter.rect_filled(rect, 0.0, to_color32(super::model::ylgnbu(t)));
        }
        painter.text(
            egui::pos2(bar_x + width + 8.0, origin.y + 9.0),
            Align2::LEFT_CENTER,
            format_value(grid.max),
            FontId::proportional(11.0),
            text_color,
        );
    }

    /// Draw an aggregated summary as a striped grid.
    pub fn draw_summary_table(ui: &mut egui::Ui, id: &str, summary: &AggregatedSummary) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id))
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for name in summary.key_columns.iter().chain(&summary.value_columns) {
                            ui.label(RichText::new(name).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in &summary.rows {
                            for key in &row.key {
                                ui.label(RichText::new(key.to_string()).size(12.0).strong());
                            }
                            for value in &row.values {
                                let text = format_optional(*value);
                                ui.label(RichText::new(text).size(12.0).monospace());
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Draw a describe table: statistics down, columns across.
    pub fn draw_describe_table(ui: &mut egui::Ui, id: &str, table: &DescribeTable) {
        let stats = table.populated_rows();

        egui::ScrollArea::horizontal()
            .id_salt(format!("{}_scroll", id))
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for column in &table.columns {
                            ui.label(RichText::new(&column.name).strong().size(12.0));
                        }
                        ui.end_row();

                        for stat in stats {
                            ui.label(RichText::new(stat).strong().size(12.0));
                            for column in &table.columns {
                                let text = table.cell(stat, column).unwrap_or_else(|| MISSING.to_string());
                                ui.label(RichText::new(text).size(12.0).monospace());
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
