//! Chart Models
//! Plot-ready data derived from aggregated summaries, shared by the
//! interactive plotter and the static renderer.

use crate::data::labels::{MONTH, WEEKDAY};
use crate::stats::{AggregateError, AggregatedSummary, KeyValue, Matrix};
use serde::Serialize;

pub type Rgb = (u8, u8, u8);

/// Fallback for seasons without an assigned color
pub const NEUTRAL: Rgb = (190, 190, 190);

/// Bar colors per season label.
pub const SEASON_COLORS: [(&str, Rgb); 4] = [
    ("Winter", (135, 206, 250)), // Light sky blue
    ("Spring", (144, 238, 144)), // Light green
    ("Summer", (255, 215, 0)),   // Gold
    ("Fall", (240, 128, 128)),   // Light coral
];

/// Line colors for trend series, cycled.
pub const SERIES_PALETTE: [Rgb; 6] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
];

/// YlGnBu color stops, light to dark.
const YLGNBU: [Rgb; 9] = [
    (255, 255, 217),
    (237, 248, 177),
    (199, 233, 180),
    (127, 205, 187),
    (65, 182, 196),
    (29, 145, 192),
    (34, 94, 168),
    (37, 52, 148),
    (8, 29, 88),
];

pub fn season_color(label: &str) -> Rgb {
    SEASON_COLORS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL)
}

pub fn series_color(index: usize) -> Rgb {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

/// Sample the YlGnBu scale at `t` in [0, 1].
pub fn ylgnbu(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (YLGNBU.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (lower + 1).min(YLGNBU.len() - 1);
    let frac = scaled - lower as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (YLGNBU[lower], YLGNBU[upper]);
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// Position on the category axis.
    pub x: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

/// Summed usage per month, one series per year.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrend {
    /// Month labels in calendar order, unknown labels appended.
    pub categories: Vec<String>,
    pub series: Vec<TrendSeries>,
}

impl MonthlyTrend {
    /// Build from a summary keyed by (year, month).
    pub fn from_summary(summary: &AggregatedSummary, value: &str) -> Result<Self, AggregateError> {
        let idx = summary.value_index(value)?;

        let mut categories: Vec<String> = MONTH.labels().iter().map(|l| l.to_string()).collect();
        let mut series: Vec<TrendSeries> = Vec::new();

        for row in &summary.rows {
            let (Some(year), Some(month), Some(total)) =
                (row.key.first(), row.key.get(1), row.values[idx])
            else {
                continue;
            };

            let month = month.to_string();
            let x = match categories.iter().position(|c| *c == month) {
                Some(x) => x,
                None => {
                    categories.push(month);
                    categories.len() - 1
                }
            };

            let name = year.to_string();
            match series.iter_mut().find(|s| s.name == name) {
                Some(s) => s.points.push(TrendPoint { x, value: total }),
                None => series.push(TrendSeries {
                    name,
                    points: vec![TrendPoint { x, value: total }],
                }),
            }
        }

        for s in &mut series {
            s.points.sort_by_key(|p| p.x);
        }

        Ok(Self { categories, series })
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.value))
            .fold(0.0, f64::max)
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonBar {
    pub label: String,
    pub total: f64,
    pub color: Rgb,
}

/// Total usage per season, largest first.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonTotals {
    pub bars: Vec<SeasonBar>,
}

impl SeasonTotals {
    /// Build from a summary keyed by season, sorting it descending by `value`.
    pub fn from_summary(summary: AggregatedSummary, value: &str) -> Result<Self, AggregateError> {
        let sorted = summary.sorted_desc_by(value)?;
        let idx = sorted.value_index(value)?;

        let bars = sorted
            .rows
            .iter()
            .filter_map(|row| {
                let label = row.key.first()?.to_string();
                Some(SeasonBar {
                    color: season_color(&label),
                    total: row.values[idx]?,
                    label,
                })
            })
            .collect();

        Ok(Self { bars })
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.total).fold(0.0, f64::max)
    }

    pub fn peak(&self) -> Option<&SeasonBar> {
        self.bars.first()
    }
}

/// Weekday by hour grid of summed usage.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapGrid {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
    pub min: f64,
    pub max: f64,
}

impl HeatmapGrid {
    /// Rows keyed by weekday code get day names, columns keep the hour.
    pub fn from_matrix(matrix: Matrix) -> Self {
        let row_labels = matrix
            .row_keys
            .iter()
            .map(|k| match k {
                KeyValue::Code(code) => WEEKDAY.label_or_code(*code),
                other => other.to_string(),
            })
            .collect();
        let col_labels = matrix.col_keys.iter().map(|k| k.to_string()).collect();
        let (min, max) = matrix.value_range().unwrap_or((0.0, 0.0));

        Self {
            row_labels,
            col_labels,
            cells: matrix.cells,
            min,
            max,
        }
    }

    /// Position of a value on the color scale.
    pub fn normalized(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }

    pub fn cell_color(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) => ylgnbu(self.normalized(v)),
            None => (255, 255, 255),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Aggregator, Statistic};
    use polars::prelude::*;

    #[test]
    fn trend_places_months_on_calendar_axis() {
        let df = df!(
            "yr" => &["2011", "2012", "2011", "2012"],
            "mnth" => &["March", "January", "January", "March"],
            "cnt" => &[30i64, 100, 10, 300]
        )
        .unwrap();
        let summary =
            Aggregator::aggregate(&df, &["yr", "mnth"], "cnt", &[Statistic::Sum]).unwrap();
        let trend = MonthlyTrend::from_summary(&summary, "cnt_sum").unwrap();

        assert_eq!(trend.categories.len(), 12);
        assert_eq!(trend.series.len(), 2);
        assert_eq!(trend.series[0].name, "2011");
        let xs: Vec<usize> = trend.series[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 2]);
        assert_eq!(trend.max_value(), 300.0);
        assert_eq!(trend.point_count(), 4);
    }

    #[test]
    fn season_bars_sorted_with_fixed_colors() {
        let df = df!(
            "season" => &["Winter", "Summer", "Fall", "Summer"],
            "cnt" => &[5i64, 10, 7, 10]
        )
        .unwrap();
        let summary = Aggregator::aggregate(&df, &["season"], "cnt", &[Statistic::Sum]).unwrap();
        let totals = SeasonTotals::from_summary(summary, "cnt_sum").unwrap();

        let labels: Vec<&str> = totals.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Summer", "Fall", "Winter"]);
        assert_eq!(totals.peak().map(|b| b.total), Some(20.0));
        assert_eq!(totals.bars[0].color, (255, 215, 0));
        assert_eq!(season_color("7"), NEUTRAL);
    }

    #[test]
    fn heatmap_rows_use_day_names() {
        let df = df!(
            "weekday" => &[0i64, 6],
            "hr" => &[8i64, 8],
            "cnt" => &[1i64, 3]
        )
        .unwrap();
        let matrix = Aggregator::aggregate(&df, &["weekday", "hr"], "cnt", &[Statistic::Sum])
            .unwrap()
            .unstack("cnt_sum")
            .unwrap();
        let grid = HeatmapGrid::from_matrix(matrix);

        assert_eq!(grid.row_labels, vec!["Sunday", "Saturday"]);
        assert_eq!(grid.col_labels, vec!["8"]);
        assert_eq!(grid.normalized(2.0), 0.5);
        assert_eq!(grid.cell_color(Some(1.0)), YLGNBU[0]);
        assert_eq!(grid.cell_color(Some(3.0)), YLGNBU[8]);
    }

    #[test]
    fn color_scale_is_clamped() {
        assert_eq!(ylgnbu(-1.0), YLGNBU[0]);
        assert_eq!(ylgnbu(2.0), YLGNBU[8]);
        assert_eq!(ylgnbu(f64::NAN), YLGNBU[0]);
    }
}
