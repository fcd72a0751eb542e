//! Statistics Calculator Module
//! Descriptive statistics per column, in the shape of a `describe` table.

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Numeric summary of one column or group.
#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample deviation, `None` below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for NumericSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: None,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Text,
    Date,
}

/// Summary of one column. Which fields are set depends on `kind`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub count: usize,
    pub unique: Option<usize>,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub numeric: Option<NumericSummary>,
}

/// Row labels of a describe table, top to bottom.
pub const DESCRIBE_ROWS: [&str; 13] = [
    "count", "unique", "top", "freq", "first", "last", "mean", "std", "min", "25%", "50%",
    "75%", "max",
];

/// Descriptive statistics of every column in a table.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeTable {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DescribeTable {
    /// Formatted cell for a statistic row and column, `None` when not applicable.
    pub fn cell(&self, stat: &str, column: &ColumnSummary) -> Option<String> {
        let numeric = column.numeric.as_ref();
        match stat {
            "count" => Some(column.count.to_string()),
            "unique" => column.unique.map(|v| v.to_string()),
            "top" => column.top.clone(),
            "freq" => column.freq.map(|v| v.to_string()),
            "first" => column.first.clone(),
            "last" => column.last.clone(),
            "mean" => numeric.map(|n| format_value(n.mean)),
            "std" => numeric.and_then(|n| n.std).map(format_value),
            "min" => numeric.map(|n| format_value(n.min)),
            "25%" => numeric.map(|n| format_value(n.q25)),
            "50%" => numeric.map(|n| format_value(n.median)),
            "75%" => numeric.map(|n| format_value(n.q75)),
            "max" => numeric.map(|n| format_value(n.max)),
            _ => None,
        }
    }

    /// Statistic rows that have a value in at least one column.
    pub fn populated_rows(&self) -> Vec<&'static str> {
        DESCRIBE_ROWS
            .iter()
            .copied()
            .filter(|stat| self.columns.iter().any(|c| self.cell(stat, c).is_some()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Placeholder for undefined cells.
pub const MISSING: &str = "-";

/// Format a statistic the way the tables show it.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        MISSING.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.3}", v)
    }
}

/// Format a possibly undefined statistic.
pub fn format_optional(v: Option<f64>) -> String {
    v.map(format_value).unwrap_or_else(|| MISSING.to_string())
}

pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_temporal(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> NumericSummary {
        let n = values.len();
        if n == 0 {
            return NumericSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let std = if n > 1 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        NumericSummary {
            count: n,
            mean: values.iter().mean(),
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Non-null, non-NaN values of a column as `f64`.
    pub fn numeric_values(column: &Column) -> PolarsResult<Vec<f64>> {
        let cast = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    /// Column values rendered as text, nulls kept as `None`.
    pub fn text_values(column: &Column) -> PolarsResult<Vec<Option<String>>> {
        let cast = column.as_materialized_series().cast(&DataType::String)?;
        Ok(cast
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Summarize one column according to its type.
    pub fn describe_column(column: &Column) -> PolarsResult<ColumnSummary> {
        let dtype = column.dtype();
        let mut summary = ColumnSummary {
            name: column.name().to_string(),
            kind: ColumnKind::Text,
            count: column.len() - column.null_count(),
            unique: None,
            top: None,
            freq: None,
            first: None,
            last: None,
            numeric: None,
        };

        if is_numeric(dtype) {
            let values = Self::numeric_values(column)?;
            summary.kind = ColumnKind::Numeric;
            summary.count = values.len();
            summary.numeric = Some(Self::compute_descriptive_stats(&values));
            return Ok(summary);
        }

        let values: Vec<String> = Self::text_values(column)?.into_iter().flatten().collect();
        let frequencies = Self::frequencies(&values);
        summary.unique = Some(frequencies.len());

        if is_temporal(dtype) {
            // ISO dates sort lexicographically
            summary.kind = ColumnKind::Date;
            summary.first = values.iter().min().cloned();
            summary.last = values.iter().max().cloned();
        } else if let Some((top, freq)) = Self::most_frequent(&frequencies) {
            summary.top = Some(top);
            summary.freq = Some(freq);
        }

        Ok(summary)
    }

    /// Count of each distinct value with the index it was first seen at.
    fn frequencies(values: &[String]) -> HashMap<&str, (usize, usize)> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, v) in values.iter().enumerate() {
            counts.entry(v.as_str()).or_insert((0, i)).0 += 1;
        }
        counts
    }

    /// Highest count wins, ties go to the value seen first.
    fn most_frequent(frequencies: &HashMap<&str, (usize, usize)>) -> Option<(String, usize)> {
        frequencies
            .iter()
            .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(value, (count, _))| (value.to_string(), *count))
    }

    /// Describe every column of a table, columns computed in parallel.
    pub fn describe(df: &DataFrame) -> PolarsResult<DescribeTable> {
        let columns = df
            .get_columns()
            .par_iter()
            .map(Self::describe_column)
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(DescribeTable {
            rows: df.height(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
        let std = stats.std.unwrap();
        assert!((std - 1.2909944487).abs() < 1e-9);
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, 7.0);
    }

    #[test]
    fn empty_input_is_all_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn describe_mixes_numeric_and_text_columns() {
        let df = df!(
            "mnth" => &["May", "June", "May", "July"],
            "temp" => &[Some(0.2), Some(0.4), None, Some(0.6)]
        )
        .unwrap();
        let table = StatsCalculator::describe(&df).unwrap();

        let mnth = table.column("mnth").unwrap();
        assert_eq!(mnth.kind, ColumnKind::Text);
        assert_eq!(mnth.count, 4);
        assert_eq!(mnth.unique, Some(3));
        assert_eq!(mnth.top.as_deref(), Some("May"));
        assert_eq!(mnth.freq, Some(2));

        let temp = table.column("temp").unwrap();
        assert_eq!(temp.kind, ColumnKind::Numeric);
        assert_eq!(temp.count, 3);
        assert_eq!(table.cell("mean", temp).as_deref(), Some("0.400"));
        assert_eq!(table.cell("top", temp), None);

        let rows = table.populated_rows();
        assert!(rows.contains(&"top"));
        assert!(!rows.contains(&"first"));
    }

    #[test]
    fn top_ties_go_to_first_seen() {
        let df = df!("weather" => &["rain", "sun", "sun", "rain"]).unwrap();
        let table = StatsCalculator::describe(&df).unwrap();
        assert_eq!(table.columns[0].top.as_deref(), Some("rain"));
    }

    #[test]
    fn formats_whole_and_fractional_values() {
        assert_eq!(format_value(1061129.0), "1061129");
        assert_eq!(format_value(0.4954), "0.495");
        assert_eq!(format_value(f64::NAN), "-");
        assert_eq!(format_optional(None), format_value(f64::NAN));
        assert_eq!(format_optional(Some(2.5)), "2.500");
    }
}
