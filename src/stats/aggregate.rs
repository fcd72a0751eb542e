//! Aggregation Pipeline Module
//! Groups table rows by categorical keys and computes per-group statistics.

use super::calculator::{is_numeric, StatsCalculator};
use crate::data::labels::{is_integer, mapping_for};
use crate::data::validator::missing_columns;
use polars::prelude::*;
use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("At least one grouping column is required")]
    NoGroupingColumns,
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Unstacking needs exactly two grouping columns, found {0}")]
    UnstackShape(usize),
    #[error("No value column named '{0}'")]
    UnknownValue(String),
    #[error("Grouping column '{0}' holds non-integer numbers")]
    FloatKey(String),
}

/// Per-group statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Statistic {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Std,
    /// Distinct non-null values, any column type.
    NUnique,
}

impl Statistic {
    pub fn suffix(&self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Sum => "sum",
            Statistic::Mean => "mean",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Std => "std",
            Statistic::NUnique => "nunique",
        }
    }

    fn needs_numeric(&self) -> bool {
        !matches!(self, Statistic::Count | Statistic::NUnique)
    }
}

/// One output column: `stat` of `column`, reported as `name`.
#[derive(Debug, Clone)]
pub struct NamedAgg {
    pub name: String,
    pub column: String,
    pub stat: Statistic,
}

impl NamedAgg {
    pub fn new(name: impl Into<String>, column: impl Into<String>, stat: Statistic) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            stat,
        }
    }
}

/// One component of a group key.
///
/// Integer codes order numerically. Labels order by their mapping's ordinal,
/// labels outside the mapping after all known ones. Other text orders
/// alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Code(i64),
    Label { rank: usize, name: String },
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Code(code) => write!(f, "{}", code),
            KeyValue::Label { name, .. } => f.write_str(name),
            KeyValue::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for KeyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyValue::Code(code) => serializer.serialize_i64(*code),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub key: Vec<KeyValue>,
    /// One entry per value column, `None` where the statistic is undefined.
    pub values: Vec<Option<f64>>,
}

/// Transient per-group table produced by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedSummary {
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Dense two-key table, rows from the first key and columns from the second.
#[derive(Debug, Clone, Serialize)]
pub struct Matrix {
    pub row_keys: Vec<KeyValue>,
    pub col_keys: Vec<KeyValue>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Matrix {
    /// Smallest and largest defined cell.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl AggregatedSummary {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value_index(&self, name: &str) -> Result<usize, AggregateError> {
        self.value_columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AggregateError::UnknownValue(name.to_string()))
    }

    /// Value of `name` for the group with exactly this key.
    pub fn get(&self, key: &[KeyValue], name: &str) -> Option<f64> {
        let idx = self.value_index(name).ok()?;
        self.rows
            .iter()
            .find(|r| r.key == key)
            .and_then(|r| r.values[idx])
    }

    /// Reorder rows by a value column, largest first, undefined values last.
    pub fn sorted_desc_by(mut self, name: &str) -> Result<Self, AggregateError> {
        let idx = self.value_index(name)?;
        self.rows.sort_by(|a, b| match (a.values[idx], b.values[idx]) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(self)
    }

    /// Pivot a two-key summary into a matrix of one value column.
    ///
    /// Key combinations with no rows become `None` cells.
    pub fn unstack(&self, name: &str) -> Result<Matrix, AggregateError> {
        if self.key_columns.len() != 2 {
            return Err(AggregateError::UnstackShape(self.key_columns.len()));
        }
        let idx = self.value_index(name)?;

        let row_keys: Vec<KeyValue> = self
            .rows
            .iter()
            .map(|r| r.key[0].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let col_keys: Vec<KeyValue> = self
            .rows
            .iter()
            .map(|r| r.key[1].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![None; col_keys.len()]; row_keys.len()];
        for row in &self.rows {
            let (Ok(r), Ok(c)) = (
                row_keys.binary_search(&row.key[0]),
                col_keys.binary_search(&row.key[1]),
            ) else {
                continue;
            };
            cells[r][c] = row.values[idx];
        }

        Ok(Matrix {
            row_keys,
            col_keys,
            cells,
        })
    }
}

/// Values of one aggregation input, extracted once per call.
enum AggInput {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// Group-by/aggregate over polars tables.
pub struct Aggregator;

impl Aggregator {
    /// Group `df` by `keys` and compute `stats` of `target`.
    ///
    /// Output columns are named `{target}_{stat}`.
    pub fn aggregate(
        df: &DataFrame,
        keys: &[&str],
        target: &str,
        stats: &[Statistic],
    ) -> Result<AggregatedSummary, AggregateError> {
        let aggs: Vec<NamedAgg> = stats
            .iter()
            .map(|s| NamedAgg::new(format!("{}_{}", target, s.suffix()), target, *s))
            .collect();
        Self::aggregate_named(df, keys, &aggs)
    }

    /// Group `df` by `keys` and compute each named aggregation.
    ///
    /// Rows with a missing key are dropped. Groups come out in key order.
    pub fn aggregate_named(
        df: &DataFrame,
        keys: &[&str],
        aggs: &[NamedAgg],
    ) -> Result<AggregatedSummary, AggregateError> {
        if keys.is_empty() {
            return Err(AggregateError::NoGroupingColumns);
        }

        let mut required: Vec<&str> = keys.to_vec();
        required.extend(aggs.iter().map(|a| a.column.as_str()));
        let missing = missing_columns(df, &required);
        if !missing.is_empty() {
            return Err(AggregateError::MissingColumns(missing));
        }

        let key_values = keys
            .iter()
            .map(|k| Self::key_values(df.column(k)?, k))
            .collect::<Result<Vec<_>, AggregateError>>()?;

        let mut groups: BTreeMap<Vec<KeyValue>, Vec<usize>> = BTreeMap::new();
        for row in 0..df.height() {
            let key: Option<Vec<KeyValue>> = key_values.iter().map(|c| c[row].clone()).collect();
            if let Some(key) = key {
                groups.entry(key).or_default().push(row);
            }
        }

        let inputs = aggs
            .iter()
            .map(|a| Self::agg_input(df, a))
            .collect::<Result<Vec<_>, AggregateError>>()?;

        let rows = groups
            .into_iter()
            .map(|(key, members)| SummaryRow {
                key,
                values: aggs
                    .iter()
                    .zip(&inputs)
                    .map(|(agg, input)| Self::compute(agg.stat, input, &members))
                    .collect(),
            })
            .collect();

        Ok(AggregatedSummary {
            key_columns: keys.iter().map(|k| k.to_string()).collect(),
            value_columns: aggs.iter().map(|a| a.name.clone()).collect(),
            rows,
        })
    }

    fn key_values(column: &Column, name: &str) -> Result<Vec<Option<KeyValue>>, AggregateError> {
        let series = column.as_materialized_series();

        if is_integer(series.dtype()) {
            let codes = series.cast(&DataType::Int64)?;
            return Ok(codes.i64()?.into_iter().map(|c| c.map(KeyValue::Code)).collect());
        }
        if is_numeric(series.dtype()) {
            return Err(AggregateError::FloatKey(name.to_string()));
        }

        let mapping = mapping_for(name);
        Ok(StatsCalculator::text_values(column)?
            .into_iter()
            .map(|v| {
                v.map(|text| match mapping {
                    Some(m) => KeyValue::Label {
                        rank: m.rank_of(&text).unwrap_or(usize::MAX),
                        name: text,
                    },
                    None => KeyValue::Text(text),
                })
            })
            .collect())
    }

    fn agg_input(df: &DataFrame, agg: &NamedAgg) -> Result<AggInput, AggregateError> {
        let column = df.column(&agg.column)?;

        if !agg.stat.needs_numeric() {
            return Ok(AggInput::Text(StatsCalculator::text_values(column)?));
        }
        if !is_numeric(column.dtype()) {
            return Err(AggregateError::NotNumeric(agg.column.clone()));
        }

        let cast = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(AggInput::Numeric(
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|v| !v.is_nan()))
                .collect(),
        ))
    }

    fn compute(stat: Statistic, input: &AggInput, members: &[usize]) -> Option<f64> {
        match input {
            AggInput::Text(values) => {
                let present = members.iter().filter_map(|&i| values[i].as_deref());
                match stat {
                    Statistic::NUnique => Some(present.collect::<HashSet<_>>().len() as f64),
                    _ => Some(present.count() as f64),
                }
            }
            AggInput::Numeric(values) => {
                let present: Vec<f64> = members.iter().filter_map(|&i| values[i]).collect();
                Self::compute_numeric(stat, &present)
            }
        }
    }

    fn compute_numeric(stat: Statistic, values: &[f64]) -> Option<f64> {
        match stat {
            Statistic::Count | Statistic::NUnique => Some(values.len() as f64),
            Statistic::Sum => Some(values.iter().sum()),
            Statistic::Mean if values.is_empty() => None,
            Statistic::Mean => Some(values.iter().mean()),
            Statistic::Min => values.iter().copied().reduce(f64::min),
            Statistic::Max => values.iter().copied().reduce(f64::max),
            // Sample deviation is undefined below two values
            Statistic::Std if values.len() < 2 => None,
            Statistic::Std => Some(values.iter().std_dev()),
        }
    }
}
