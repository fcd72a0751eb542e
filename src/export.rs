//! Export Module
//! Writes the active page's charts as PNG files and its data as JSON.

use crate::charts::StaticChartRenderer;
use crate::views::PageView;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to render {name}: {message}")]
    Render { name: String, message: String },
    #[error("Failed to serialize {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Exports pages to a directory.
pub struct PageExporter {
    pub width: u32,
    pub height: u32,
}

impl Default for PageExporter {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
        }
    }
}

impl PageExporter {
    /// Write every chart and the page data into `dir`, returning the written files.
    pub fn export(&self, view: &PageView, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let page = view.page().slug();
        let mut written = Vec::new();

        match view {
            PageView::Summary(v) => {
                written.push(Self::write_json(v, &dir.join(format!("{}.json", page)))?);
            }
            PageView::Visualization(v) => {
                if let Some(trend) = &v.monthly_trend {
                    let path = dir.join("monthly_trend.png");
                    StaticChartRenderer::render_monthly_trend(trend, &path, self.width, self.height)
                        .map_err(|e| Self::render_error("monthly trend", e))?;
                    written.push(path);
                }
                if let Some(totals) = &v.season_totals {
                    let path = dir.join("season_totals.png");
                    StaticChartRenderer::render_season_totals(totals, &path, self.width, self.height)
                        .map_err(|e| Self::render_error("season totals", e))?;
                    written.push(path);
                }
                written.push(Self::write_json(v, &dir.join(format!("{}.json", page)))?);
            }
            PageView::Advanced(v) => {
                if let Some(grid) = &v.heatmap {
                    let path = dir.join("weekday_hour_heatmap.png");
                    StaticChartRenderer::render_heatmap(grid, &path, self.width, self.height)
                        .map_err(|e| Self::render_error("heatmap", e))?;
                    written.push(path);
                }
                written.push(Self::write_json(v, &dir.join(format!("{}.json", page)))?);
            }
        }

        info!(page, files = written.len(), dir = %dir.display(), "Page exported");
        Ok(written)
    }

    fn render_error(name: &str, e: Box<dyn std::error::Error>) -> ExportError {
        ExportError::Render {
            name: name.to_string(),
            message: e.to_string(),
        }
    }

    fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<PathBuf, ExportError> {
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| {
            ExportError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(path.to_path_buf())
    }
}
