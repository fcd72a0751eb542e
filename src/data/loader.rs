//! CSV Data Loader Module
//! Loads the daily and hourly tables with Polars and caches them for the
//! lifetime of the loader.

use super::labels::{LabelMapper, MappingOutcome, MONTH, YEAR};
use super::validator::missing_columns;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Date column of the daily table.
pub const DATE_COLUMN: &str = "dteday";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: PolarsError,
    },
    #[error("Column '{column}' in {} is not a date (found {found})", .path.display())]
    DateColumn {
        path: PathBuf,
        column: String,
        found: String,
    },
}

/// Locations of the two source tables.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub daily: PathBuf,
    pub hourly: PathBuf,
}

/// Both tables after loading and label mapping.
#[derive(Debug)]
pub struct Dataset {
    /// One row per day, `yr` and `mnth` carry display labels.
    pub daily: DataFrame,
    /// One row per (day, hour), codes untouched.
    pub hourly: DataFrame,
    /// Result of each label mapping applied at load time.
    pub mapping_outcomes: Vec<MappingOutcome>,
}

/// Loads the source tables once and hands out shared references afterwards.
///
/// Each loader owns its own cache, so separate sessions never share state.
/// A failed load is not cached.
pub struct DataLoader {
    paths: DataPaths,
    cache: OnceCell<Arc<Dataset>>,
}

impl DataLoader {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            cache: OnceCell::new(),
        }
    }

    /// Load both tables, reading the files only on the first successful call.
    pub fn load(&self) -> Result<Arc<Dataset>, LoaderError> {
        self.cache
            .get_or_try_init(|| Self::read_dataset(&self.paths).map(Arc::new))
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn read_dataset(paths: &DataPaths) -> Result<Dataset, LoaderError> {
        let daily = Self::read_csv(&paths.daily, true)?;
        Self::ensure_date_column(&daily, &paths.daily)?;
        let hourly = Self::read_csv(&paths.hourly, false)?;

        let (daily, mapping_outcomes) = Self::apply_labels(daily, &paths.daily)?;

        info!(
            daily_rows = daily.height(),
            daily_columns = daily.width(),
            hourly_rows = hourly.height(),
            hourly_columns = hourly.width(),
            "Dataset loaded"
        );

        Ok(Dataset {
            daily,
            hourly,
            mapping_outcomes,
        })
    }

    /// Read a CSV file using Polars.
    fn read_csv(path: &Path, parse_dates: bool) -> Result<DataFrame, LoaderError> {
        std::fs::metadata(path).map_err(|source| LoaderError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), parse_dates, "Reading CSV");

        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_try_parse_dates(parse_dates)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn ensure_date_column(df: &DataFrame, path: &Path) -> Result<(), LoaderError> {
        let found = match df.column(DATE_COLUMN) {
            Ok(column) => match column.dtype() {
                DataType::Date | DataType::Datetime(_, _) => return Ok(()),
                other => other.to_string(),
            },
            Err(_) => "no such column".to_string(),
        };

        Err(LoaderError::DateColumn {
            path: path.to_path_buf(),
            column: DATE_COLUMN.to_string(),
            found,
        })
    }

    /// Label the year and month columns of the daily table where present.
    fn apply_labels(
        mut daily: DataFrame,
        path: &Path,
    ) -> Result<(DataFrame, Vec<MappingOutcome>), LoaderError> {
        let mut outcomes = Vec::new();

        for mapping in [&YEAR, &MONTH] {
            if !missing_columns(&daily, &[mapping.column]).is_empty() {
                continue;
            }
            let (mapped, outcome) = LabelMapper::map_column(&daily, mapping.column, mapping)
                .map_err(|source| LoaderError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            daily = mapped;
            outcomes.push(outcome);
        }

        Ok((daily, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DAILY: &str = "\
instant,dteday,season,yr,mnth,weekday,cnt
1,2011-01-01,1,0,1,6,985
2,2011-01-02,1,0,1,0,801
3,2012-06-15,2,1,6,5,7000
";

    const HOURLY: &str = "\
instant,dteday,season,yr,mnth,hr,weekday,cnt
1,2011-01-01,1,0,1,0,6,16
2,2011-01-01,1,0,1,1,6,40
";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn loader_for(dir: &Path, daily: &str, hourly: &str) -> DataLoader {
        DataLoader::new(DataPaths {
            daily: write(dir, "day.csv", daily),
            hourly: write(dir, "hour.csv", hourly),
        })
    }

    #[test]
    fn parses_dates_and_labels_daily_table() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_for(dir.path(), DAILY, HOURLY);
        let dataset = loader.load().unwrap();

        assert_eq!(dataset.daily.height(), 3);
        assert_eq!(dataset.hourly.height(), 2);
        assert_eq!(
            dataset.daily.column(DATE_COLUMN).unwrap().dtype(),
            &DataType::Date
        );

        let years: Vec<Option<&str>> = dataset
            .daily
            .column("yr")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(years, vec![Some("2011"), Some("2011"), Some("2012")]);

        // Hourly codes stay numeric
        assert!(dataset.hourly.column("yr").unwrap().dtype().is_integer());
        assert_eq!(dataset.mapping_outcomes.len(), 2);
    }

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader_for(dir.path(), DAILY, HOURLY);
        assert!(!loader.is_loaded());

        let first = loader.load().unwrap();
        std::fs::remove_file(&loader.paths().daily).unwrap();
        let second = loader.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.daily.height(), second.daily.height());
        assert_eq!(
            first.daily.get_column_names(),
            second.daily.get_column_names()
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DataLoader::new(DataPaths {
            daily: dir.path().join("absent.csv"),
            hourly: dir.path().join("hour.csv"),
        });

        let err = loader.load().unwrap_err();
        assert!(matches!(err, LoaderError::FileRead { .. }));
        assert!(err.to_string().contains("absent.csv"));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let daily = "dteday,yr,cnt\nnot-a-date,0,1\nstill-not,1,2\n";
        let loader = loader_for(dir.path(), daily, HOURLY);

        let err = loader.load().unwrap_err();
        assert!(matches!(err, LoaderError::DateColumn { .. }));
    }
}
