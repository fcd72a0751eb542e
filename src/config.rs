//! Configuration loader for the bike-share dashboard.
//!
//! All runtime settings come from environment variables, with optional `.env`
//! support provided by the caller. Every value has a default so the dashboard
//! runs from a directory holding `day.csv` and `hour.csv`.

use crate::data::DataPaths;
use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

const DAY_CSV_VAR: &str = "BIKESHARE_DAY_CSV";
const HOUR_CSV_VAR: &str = "BIKESHARE_HOUR_CSV";
const EXPORT_DIR_VAR: &str = "BIKESHARE_EXPORT_DIR";

/// Read an optional path variable, rejecting empty values.
fn path_var(name: &str, default: &str) -> Result<PathBuf> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(anyhow!("{} must not be empty", name)),
        Ok(value) => Ok(PathBuf::from(value.trim())),
        Err(env::VarError::NotPresent) => Ok(PathBuf::from(default)),
        Err(e) => Err(anyhow!("Invalid {}: {}", name, e)),
    }
}

/// Application configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Daily table CSV.
    pub day_csv: PathBuf,

    /// Hourly table CSV.
    pub hour_csv: PathBuf,

    /// Default folder offered when exporting charts.
    pub export_dir: PathBuf,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BIKESHARE_DAY_CSV` – daily table (default: `day.csv`)
/// - `BIKESHARE_HOUR_CSV` – hourly table (default: `hour.csv`)
/// - `BIKESHARE_EXPORT_DIR` – export folder (default: `exports`)
pub fn load_from_env() -> Result<Config> {
    Ok(Config {
        day_csv: path_var(DAY_CSV_VAR, "day.csv")?,
        hour_csv: path_var(HOUR_CSV_VAR, "hour.csv")?,
        export_dir: path_var(EXPORT_DIR_VAR, "exports")?,
    })
}

impl Config {
    pub fn data_paths(&self) -> DataPaths {
        DataPaths {
            daily: self.day_csv.clone(),
            hourly: self.hour_csv.clone(),
        }
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  {:<20} : {}", DAY_CSV_VAR, self.day_csv.display());
        tracing::info!("  {:<20} : {}", HOUR_CSV_VAR, self.hour_csv.display());
        tracing::info!("  {:<20} : {}", EXPORT_DIR_VAR, self.export_dir.display());
    }
}
