//! Bike-Share Dashboard Main Application
//! Main window with the navigation sidebar and the page viewer.

use crate::gui::{PageViewer, Sidebar, SidebarAction};
use bikeshare_dashboard::data::Dataset;
use bikeshare_dashboard::export::PageExporter;
use bikeshare_dashboard::views::{build_page, PageView};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Main application window.
pub struct DashboardApp {
    dataset: Arc<Dataset>,
    sidebar: Sidebar,
    view: PageView,
    export_dir: PathBuf,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset: Arc<Dataset>, export_dir: PathBuf) -> Self {
        let sidebar = Sidebar::new();
        let view = build_page(sidebar.page, &dataset);
        Self {
            dataset,
            sidebar,
            view,
            export_dir,
        }
    }

    /// Rebuild the active page from scratch
    fn handle_page_changed(&mut self) {
        self.view = build_page(self.sidebar.page, &self.dataset);
        self.sidebar.set_status(format!("Showing {}", self.sidebar.page.title()));
    }

    /// Export the active page to a folder chosen by the user
    fn handle_export(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .pick_folder()
        else {
            return; // User cancelled
        };

        match PageExporter::default().export(&self.view, &dir) {
            Ok(files) => {
                self.sidebar
                    .set_status(format!("Exported {} files to {}", files.len(), dir.display()));
                if let Err(e) = open::that(&dir) {
                    info!(error = %e, "Could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                self.sidebar.set_error(format!("Export error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        SidePanel::left("sidebar")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                match self.sidebar.show(ui) {
                    SidebarAction::PageChanged => self.handle_page_changed(),
                    SidebarAction::Export => self.handle_export(),
                    SidebarAction::None => {}
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            PageViewer::show(ui, &self.view, self.sidebar.show_raw);
        });
    }
}
