//! Bike Sharing Dashboard - interactive exploration of daily and hourly
//! bike rental tables.

mod gui;

use anyhow::{anyhow, Result};
use bikeshare_dashboard::config;
use bikeshare_dashboard::data::DataLoader;
use eframe::egui;
use gui::DashboardApp;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load_from_env()?;
    config.log_config();

    let loader = DataLoader::new(config.data_paths());
    let dataset = loader.load().map_err(|e| {
        error!(error = %e, "Could not load bike sharing data");
        anyhow!("Could not load bike sharing data: {}", e)
    })?;
    info!(
        daily_rows = dataset.daily.height(),
        hourly_rows = dataset.hourly.height(),
        "Starting dashboard"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Bike Sharing Dashboard"),
        ..Default::default()
    };

    let export_dir = config.export_dir.clone();
    eframe::run_native(
        "Bike Sharing Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dataset, export_dir)))),
    )
    .map_err(|e| anyhow!("Dashboard window failed: {}", e))
}
