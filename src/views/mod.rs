//! Views module - page models behind the navigation shell

mod pages;

pub use pages::{build_page, AdvancedView, Page, PageView, RawTable, SummaryView, VisualizationView};
