//! Page Viewer Widget
//! Central scrollable panel drawing the active page: diagnostics first,
//! then tables, charts and notes in page order.

use bikeshare_dashboard::charts::ChartPlotter;
use bikeshare_dashboard::diagnostics::{Diagnostics, Severity};
use bikeshare_dashboard::views::{AdvancedView, PageView, RawTable, SummaryView, VisualizationView};
use egui::{Color32, RichText, ScrollArea};

const RAW_ROW_HEIGHT: f32 = 18.0;
const RAW_TABLE_HEIGHT: f32 = 320.0;
const RAW_COL_WIDTH: f32 = 80.0;

pub struct PageViewer;

impl PageViewer {
    pub fn show(ui: &mut egui::Ui, view: &PageView, show_raw: bool) {
        ScrollArea::vertical()
            .id_salt("page_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(view.page().heading()).size(24.0));
                ui.add_space(8.0);
                Self::draw_diagnostics(ui, view.diagnostics());

                match view {
                    PageView::Summary(v) => Self::draw_summary(ui, v, show_raw),
                    PageView::Visualization(v) => Self::draw_visualization(ui, v),
                    PageView::Advanced(v) => Self::draw_advanced(ui, v),
                }
            });
    }

    fn draw_diagnostics(ui: &mut egui::Ui, diagnostics: &Diagnostics) {
        for item in diagnostics.items() {
            let (icon, color) = match item.severity {
                Severity::Error => ("⚠", Color32::from_rgb(220, 53, 69)),
                Severity::Warning => ("ℹ", Color32::from_rgb(255, 165, 0)),
            };
            ui.label(
                RichText::new(format!("{} {}", icon, item.message))
                    .size(13.0)
                    .color(color),
            );
        }
        if !diagnostics.is_empty() {
            ui.add_space(8.0);
        }
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(12.0);
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(6.0);
    }

    fn notes(ui: &mut egui::Ui, notes: &[String]) {
        if notes.is_empty() {
            return;
        }
        ui.add_space(6.0);
        for note in notes {
            ui.label(RichText::new(note).size(13.0));
        }
    }

    fn draw_summary(ui: &mut egui::Ui, view: &SummaryView, show_raw: bool) {
        if show_raw {
            Self::section(ui, "Raw daily data");
            Self::draw_raw_table(ui, &view.raw_daily);
        }

        Self::section(ui, "Daily data statistics");
        if let Some(stats) = &view.daily_stats {
            ChartPlotter::draw_describe_table(ui, "daily_describe", stats);
        }
        Self::notes(ui, &view.daily_notes);

        Self::section(ui, "Hourly data statistics");
        if let Some(stats) = &view.hourly_stats {
            ChartPlotter::draw_describe_table(ui, "hourly_describe", stats);
        }
        Self::notes(ui, &view.hourly_notes);

        Self::section(ui, "Usage by season (hourly)");
        if let Some(seasonal) = &view.seasonal {
            ChartPlotter::draw_summary_table(ui, "seasonal_summary", seasonal);
        }
        Self::notes(ui, &view.seasonal_notes);
    }

    fn draw_visualization(ui: &mut egui::Ui, view: &VisualizationView) {
        Self::section(ui, "Monthly rentals per year");
        if let Some(trend) = &view.monthly_trend {
            ChartPlotter::draw_trend_chart(ui, trend);
        }
        Self::notes(ui, &view.trend_notes);

        Self::section(ui, "Total rentals per season");
        if let Some(totals) = &view.season_totals {
            ChartPlotter::draw_season_chart(ui, totals);
        }
        Self::notes(ui, &view.season_notes);
    }

    fn draw_advanced(ui: &mut egui::Ui, view: &AdvancedView) {
        Self::section(ui, "Rentals by weekday and hour");
        if let Some(grid) = &view.heatmap {
            ChartPlotter::draw_heatmap(ui, grid);
        }
        Self::notes(ui, &view.heatmap_notes);
    }

    /// Virtualized raw table: only visible rows are laid out.
    fn draw_raw_table(ui: &mut egui::Ui, table: &RawTable) {
        if table.headers.is_empty() {
            ui.label(RichText::new("No data").color(Color32::GRAY));
            return;
        }

        ScrollArea::horizontal().id_salt("raw_h").show(ui, |ui| {
            ui.horizontal(|ui| {
                for header in &table.headers {
                    ui.add_sized(
                        [RAW_COL_WIDTH, RAW_ROW_HEIGHT],
                        egui::Label::new(RichText::new(header).strong().size(12.0)),
                    );
                }
            });

            ScrollArea::vertical()
                .id_salt("raw_v")
                .max_height(RAW_TABLE_HEIGHT)
                .show_rows(ui, RAW_ROW_HEIGHT, table.rows.len(), |ui, row_range| {
                    for row in &table.rows[row_range] {
                        ui.horizontal(|ui| {
                            for cell in row {
                                ui.add_sized(
                                    [RAW_COL_WIDTH, RAW_ROW_HEIGHT],
                                    egui::Label::new(RichText::new(cell).size(12.0).monospace()),
                                );
                            }
                        });
                    }
                });
        });
        ui.label(
            RichText::new(format!("{} rows", table.rows.len()))
                .size(11.0)
                .color(Color32::GRAY),
        );
    }
}
