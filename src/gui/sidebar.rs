//! Sidebar Widget
//! Left side panel with page navigation, the raw-data toggle and export.

use bikeshare_dashboard::views::Page;
use egui::{Color32, RichText};

/// Left side navigation panel.
pub struct Sidebar {
    pub page: Page,
    pub show_raw: bool,
    pub status: String,
    pub status_is_error: bool,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            page: Page::default(),
            show_raw: false,
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = true;
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui) -> SidebarAction {
        let mut action = SidebarAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Bike Sharing Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Navigation =====
        ui.label(RichText::new("Choose analysis").size(14.0).strong());
        ui.add_space(5.0);

        for page in Page::ALL {
            if ui
                .radio_value(&mut self.page, page, page.title())
                .changed()
            {
                // Raw toggle never carries over to another page
                self.show_raw = false;
                action = SidebarAction::PageChanged;
            }
        }

        if self.page == Page::Summary {
            ui.add_space(10.0);
            ui.checkbox(&mut self.show_raw, "Show raw data");
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("💾 Export Page").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = SidebarAction::Export;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    PageChanged,
    Export,
}
