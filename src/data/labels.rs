//! Label Mapper Module
//! Translates integer-coded categorical columns into display labels.

use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Fixed lookup from integer code to display label.
///
/// The order of `entries` is the natural (ordinal) order of the category.
#[derive(Debug)]
pub struct LabelMapping {
    pub column: &'static str,
    pub entries: &'static [(i64, &'static str)],
}

pub const YEAR: LabelMapping = LabelMapping {
    column: "yr",
    entries: &[(0, "2011"), (1, "2012")],
};

pub const MONTH: LabelMapping = LabelMapping {
    column: "mnth",
    entries: &[
        (1, "January"),
        (2, "February"),
        (3, "March"),
        (4, "April"),
        (5, "May"),
        (6, "June"),
        (7, "July"),
        (8, "August"),
        (9, "September"),
        (10, "October"),
        (11, "November"),
        (12, "December"),
    ],
};

pub const SEASON: LabelMapping = LabelMapping {
    column: "season",
    entries: &[(1, "Winter"), (2, "Spring"), (3, "Summer"), (4, "Fall")],
};

/// Only used for heatmap row labels, the hourly table keeps its codes.
pub const WEEKDAY: LabelMapping = LabelMapping {
    column: "weekday",
    entries: &[
        (0, "Sunday"),
        (1, "Monday"),
        (2, "Tuesday"),
        (3, "Wednesday"),
        (4, "Thursday"),
        (5, "Friday"),
        (6, "Saturday"),
    ],
};

const ALL_MAPPINGS: [&LabelMapping; 4] = [&YEAR, &MONTH, &SEASON, &WEEKDAY];

/// Find the mapping registered for a column name.
pub fn mapping_for(column: &str) -> Option<&'static LabelMapping> {
    ALL_MAPPINGS.iter().copied().find(|m| m.column == column)
}

impl LabelMapping {
    pub fn label(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Ordinal position of a label within this mapping.
    pub fn rank_of(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|(_, l)| *l == label)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, l)| *l).collect()
    }

    /// Label for a code, falling back to the code itself.
    pub fn label_or_code(&self, code: i64) -> String {
        self.label(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }
}

/// What happened while mapping one column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingOutcome {
    pub column: String,
    pub mapped: usize,
    /// Codes outside the mapping domain, with how many rows carried each.
    pub unmapped: BTreeMap<i64, usize>,
}

impl MappingOutcome {
    pub fn has_misses(&self) -> bool {
        !self.unmapped.is_empty()
    }

    pub fn describe_misses(&self) -> String {
        let codes: Vec<String> = self
            .unmapped
            .iter()
            .map(|(code, rows)| format!("{} ({} rows)", code, rows))
            .collect();
        format!(
            "Column '{}' has codes without a label: {}",
            self.column,
            codes.join(", ")
        )
    }
}

/// Applies label mappings to tables.
pub struct LabelMapper;

impl LabelMapper {
    /// Replace each integer code in `column` with its label.
    ///
    /// Unmapped codes pass through as their decimal text and are reported in
    /// the outcome. Missing values stay missing. A column that is already
    /// textual is returned unchanged.
    pub fn map_column(
        df: &DataFrame,
        column: &str,
        mapping: &LabelMapping,
    ) -> PolarsResult<(DataFrame, MappingOutcome)> {
        let mut outcome = MappingOutcome {
            column: column.to_string(),
            ..Default::default()
        };

        let series = df.column(column)?.as_materialized_series();
        if !is_integer(series.dtype()) {
            debug!(column, dtype = %series.dtype(), "column is not integer coded, skipping label mapping");
            return Ok((df.clone(), outcome));
        }

        let codes = series.cast(&DataType::Int64)?;
        let labels: Vec<Option<String>> = codes
            .i64()?
            .into_iter()
            .map(|code| {
                code.map(|code| match mapping.label(code) {
                    Some(label) => {
                        outcome.mapped += 1;
                        label.to_string()
                    }
                    None => {
                        *outcome.unmapped.entry(code).or_default() += 1;
                        code.to_string()
                    }
                })
            })
            .collect();

        if outcome.has_misses() {
            warn!("{}", outcome.describe_misses());
        }

        let mut mapped = df.clone();
        mapped.with_column(Column::new(column.into(), labels))?;
        Ok((mapped, outcome))
    }
}

pub(crate) fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_code_one_is_winter() {
        assert_eq!(SEASON.label(1), Some("Winter"));
        assert_eq!(SEASON.label(4), Some("Fall"));
        assert_eq!(SEASON.label(5), None);
    }

    #[test]
    fn month_ranks_follow_calendar() {
        assert_eq!(MONTH.rank_of("January"), Some(0));
        assert_eq!(MONTH.rank_of("December"), Some(11));
        assert_eq!(MONTH.rank_of("Smarch"), None);
    }

    #[test]
    fn mapping_lookup_by_column() {
        assert_eq!(mapping_for("mnth").map(|m| m.column), Some("mnth"));
        assert!(mapping_for("cnt").is_none());
    }

    #[test]
    fn maps_codes_independent_of_order() {
        let df = df!("season" => &[4i64, 1, 1, 3, 2, 1]).unwrap();
        let (mapped, outcome) = LabelMapper::map_column(&df, "season", &SEASON).unwrap();

        let labels: Vec<Option<&str>> = mapped
            .column("season")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            labels,
            vec![
                Some("Fall"),
                Some("Winter"),
                Some("Winter"),
                Some("Summer"),
                Some("Spring"),
                Some("Winter")
            ]
        );
        assert_eq!(outcome.mapped, 6);
        assert!(!outcome.has_misses());
    }

    #[test]
    fn unmapped_codes_pass_through_and_are_reported() {
        let df = df!("season" => &[Some(1i64), Some(7), None, Some(7)]).unwrap();
        let (mapped, outcome) = LabelMapper::map_column(&df, "season", &SEASON).unwrap();

        let labels: Vec<Option<&str>> = mapped
            .column("season")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some("Winter"), Some("7"), None, Some("7")]);
        assert_eq!(outcome.unmapped.get(&7), Some(&2));
        assert!(outcome.describe_misses().contains("7 (2 rows)"));
    }

    #[test]
    fn textual_column_is_left_alone() {
        let df = df!("season" => &["Winter", "Fall"]).unwrap();
        let (mapped, outcome) = LabelMapper::map_column(&df, "season", &SEASON).unwrap();
        assert!(mapped.equals(&df));
        assert_eq!(outcome.mapped, 0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let df = df!("cnt" => &[1i64]).unwrap();
        assert!(LabelMapper::map_column(&df, "season", &SEASON).is_err());
    }
}
