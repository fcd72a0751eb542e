//! GUI module - User interface components

mod app;
mod page_viewer;
mod sidebar;

pub use app::DashboardApp;
pub use page_viewer::PageViewer;
pub use sidebar::{Sidebar, SidebarAction};
