//! Data module - CSV loading, label mapping and column checks

pub mod labels;
mod loader;
pub mod validator;

pub use labels::{LabelMapper, LabelMapping, MappingOutcome};
pub use loader::{DataLoader, DataPaths, Dataset, LoaderError, DATE_COLUMN};
pub use validator::check_columns;
