//! Page Models
//! Each navigation event builds exactly one page from the cached tables.
//! Nothing is carried over from the previous page.

use crate::charts::{HeatmapGrid, MonthlyTrend, SeasonTotals};
use crate::data::labels::SEASON;
use crate::data::{check_columns, Dataset, LabelMapper, DATE_COLUMN};
use crate::diagnostics::Diagnostics;
use crate::stats::{
    format_value, AggregateError, AggregatedSummary, Aggregator, DescribeTable, NamedAgg,
    NumericSummary, Statistic, StatsCalculator,
};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Sidebar choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Summary,
    Visualization,
    Advanced,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Summary, Page::Visualization, Page::Advanced];

    /// Label of the sidebar option.
    pub fn title(&self) -> &'static str {
        match self {
            Page::Summary => "Exploratory Summary",
            Page::Visualization => "Visualization",
            Page::Advanced => "Advanced Analysis",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Page::Summary => "📊 Exploratory Data Analysis",
            Page::Visualization => "📈 Data Visualization",
            Page::Advanced => "🔍 Advanced Analysis",
        }
    }

    /// File stem used when exporting the page.
    pub fn slug(&self) -> &'static str {
        match self {
            Page::Summary => "summary",
            Page::Visualization => "visualization",
            Page::Advanced => "advanced",
        }
    }
}

/// Table cells rendered as text for the raw-data view.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let headers = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let columns = df
            .get_columns()
            .iter()
            .map(StatsCalculator::text_values)
            .collect::<PolarsResult<Vec<_>>>()?;

        let rows = (0..df.height())
            .map(|i| {
                columns
                    .iter()
                    .map(|c| c[i].clone().unwrap_or_else(|| "null".to_string()))
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    #[serde(skip)]
    pub raw_daily: RawTable,
    pub daily_stats: Option<DescribeTable>,
    pub daily_notes: Vec<String>,
    pub hourly_stats: Option<DescribeTable>,
    pub hourly_notes: Vec<String>,
    pub seasonal: Option<AggregatedSummary>,
    pub seasonal_notes: Vec<String>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizationView {
    pub monthly_trend: Option<MonthlyTrend>,
    pub trend_notes: Vec<String>,
    pub season_totals: Option<SeasonTotals>,
    pub season_notes: Vec<String>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvancedView {
    pub heatmap: Option<HeatmapGrid>,
    pub heatmap_notes: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// The active page's content.
#[derive(Debug, Clone)]
pub enum PageView {
    Summary(SummaryView),
    Visualization(VisualizationView),
    Advanced(AdvancedView),
}

impl PageView {
    pub fn page(&self) -> Page {
        match self {
            PageView::Summary(_) => Page::Summary,
            PageView::Visualization(_) => Page::Visualization,
            PageView::Advanced(_) => Page::Advanced,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            PageView::Summary(v) => &v.diagnostics,
            PageView::Visualization(v) => &v.diagnostics,
            PageView::Advanced(v) => &v.diagnostics,
        }
    }
}

/// Build the content of `page` from the loaded tables.
pub fn build_page(page: Page, dataset: &Dataset) -> PageView {
    debug!(page = page.title(), "Building page");
    match page {
        Page::Summary => PageView::Summary(SummaryView::build(dataset)),
        Page::Visualization => PageView::Visualization(VisualizationView::build(dataset)),
        Page::Advanced => PageView::Advanced(AdvancedView::build(dataset)),
    }
}

/// One statistic of a numeric column in a describe table.
fn stat_of(table: &DescribeTable, column: &str, pick: fn(&NumericSummary) -> f64) -> Option<f64> {
    table
        .column(column)
        .and_then(|c| c.numeric.as_ref())
        .map(pick)
        .filter(|v| !v.is_nan())
}

impl SummaryView {
    pub const SEASONAL_COLUMNS: [&'static str; 3] = ["season", DATE_COLUMN, "cnt"];

    pub fn build(dataset: &Dataset) -> Self {
        let mut diagnostics = Diagnostics::new();

        for outcome in dataset.mapping_outcomes.iter().filter(|o| o.has_misses()) {
            diagnostics.warn(outcome.describe_misses());
        }

        let raw_daily = RawTable::from_dataframe(&dataset.daily).unwrap_or_else(|e| {
            diagnostics.error(format!("Could not render raw daily data: {}", e));
            RawTable::default()
        });

        let daily_stats = Self::describe(&dataset.daily, "daily", &mut diagnostics);
        let hourly_stats = Self::describe(&dataset.hourly, "hourly", &mut diagnostics);

        let seasonal = if check_columns(&dataset.hourly, &Self::SEASONAL_COLUMNS, &mut diagnostics) {
            Self::seasonal_summary(&dataset.hourly)
                .map_err(|e| diagnostics.error(format!("Seasonal analysis failed: {}", e)))
                .ok()
        } else {
            None
        };

        Self {
            raw_daily,
            daily_notes: daily_stats.as_ref().map(Self::daily_notes).unwrap_or_default(),
            hourly_notes: hourly_stats.as_ref().map(Self::hourly_notes).unwrap_or_default(),
            seasonal_notes: seasonal.as_ref().map(Self::seasonal_notes).unwrap_or_default(),
            daily_stats,
            hourly_stats,
            seasonal,
            diagnostics,
        }
    }

    fn describe(df: &DataFrame, name: &str, diagnostics: &mut Diagnostics) -> Option<DescribeTable> {
        StatsCalculator::describe(df)
            .map_err(|e| diagnostics.error(format!("Could not describe the {} table: {}", name, e)))
            .ok()
    }

    /// Distinct days and hourly usage spread per season.
    pub fn seasonal_summary(hourly: &DataFrame) -> Result<AggregatedSummary, AggregateError> {
        Aggregator::aggregate_named(
            hourly,
            &["season"],
            &[
                NamedAgg::new("dteday_nunique", DATE_COLUMN, Statistic::NUnique),
                NamedAgg::new("cnt_max", "cnt", Statistic::Max),
                NamedAgg::new("cnt_min", "cnt", Statistic::Min),
                NamedAgg::new("cnt_mean", "cnt", Statistic::Mean),
                NamedAgg::new("cnt_std", "cnt", Statistic::Std),
            ],
        )
    }

    fn daily_notes(table: &DescribeTable) -> Vec<String> {
        let mut notes = vec![format!(
            "The daily table holds {} entries, one per day of usage.",
            table.rows
        )];

        if let (Some(mean), Some(min), Some(max)) = (
            stat_of(table, "temp", |n| n.mean),
            stat_of(table, "temp", |n| n.min),
            stat_of(table, "temp", |n| n.max),
        ) {
            notes.push(format!(
                "Normalized temperature averages {:.2}, ranging from {:.2} to {:.2}.",
                mean, min, max
            ));
        }
        if let (Some(hum), Some(wind)) = (
            stat_of(table, "hum", |n| n.mean),
            stat_of(table, "windspeed", |n| n.mean),
        ) {
            notes.push(format!(
                "Humidity tends to be high with a mean of {:.2}, while windspeed averages {:.2}, so most days are fairly calm.",
                hum, wind
            ));
        }
        notes
    }

    fn hourly_notes(table: &DescribeTable) -> Vec<String> {
        let mut notes = vec![format!(
            "The hourly table is larger with {} entries and shows how usage moves through the day.",
            table.rows
        )];

        if let Some(median_hour) = stat_of(table, "hr", |n| n.median) {
            notes.push(format!(
                "The median hour is {:.0}:00, usage leans toward the middle of the day but varies with working days and seasons.",
                median_hour
            ));
        }
        if let (Some(temp), Some(hum), Some(wind)) = (
            stat_of(table, "temp", |n| n.mean),
            stat_of(table, "hum", |n| n.mean),
            stat_of(table, "windspeed", |n| n.mean),
        ) {
            notes.push(format!(
                "Weather averages match the daily table: temperature {:.2}, humidity {:.2}, windspeed {:.2}.",
                temp, hum, wind
            ));
        }
        if let Some(share) = stat_of(table, "workingday", |n| n.mean) {
            notes.push(format!(
                "About {:.0}% of the hours fall on working days, so most usage happens outside weekends.",
                share * 100.0
            ));
        }
        notes
    }

    fn seasonal_notes(summary: &AggregatedSummary) -> Vec<String> {
        let Ok(idx) = summary.value_index("cnt_mean") else {
            return Vec::new();
        };

        let peak = summary
            .rows
            .iter()
            .filter_map(|r| Some((r, r.values[idx]?)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match peak {
            Some((row, mean)) => {
                let code = row.key[0].to_string();
                let season = code
                    .parse::<i64>()
                    .ok()
                    .and_then(|c| SEASON.label(c))
                    .map(|label| format!("season {} ({})", code, label))
                    .unwrap_or_else(|| format!("season {}", code));
                vec![
                    "Usage differs noticeably between seasons.".to_string(),
                    format!(
                        "The highest average is in {}, at about {} rentals per hour, so weather and season weigh heavily on usage.",
                        season,
                        format_value(mean.round())
                    ),
                ]
            }
            None => Vec::new(),
        }
    }
}

impl VisualizationView {
    pub const TREND_COLUMNS: [&'static str; 3] = ["yr", "mnth", "cnt"];
    pub const SEASON_COLUMNS: [&'static str; 2] = ["season", "cnt"];

    pub fn build(dataset: &Dataset) -> Self {
        let mut diagnostics = Diagnostics::new();
        let daily = &dataset.daily;

        let monthly_trend = if check_columns(daily, &Self::TREND_COLUMNS, &mut diagnostics) {
            Self::monthly_trend(daily)
                .map_err(|e| diagnostics.error(format!("Monthly trend failed: {}", e)))
                .ok()
        } else {
            None
        };

        let season_totals = if check_columns(daily, &Self::SEASON_COLUMNS, &mut diagnostics) {
            Self::season_totals(daily, &mut diagnostics)
                .map_err(|e| diagnostics.error(format!("Season totals failed: {}", e)))
                .ok()
        } else {
            None
        };

        Self {
            trend_notes: monthly_trend.as_ref().map(Self::trend_notes).unwrap_or_default(),
            season_notes: season_totals.as_ref().map(Self::season_notes).unwrap_or_default(),
            monthly_trend,
            season_totals,
            diagnostics,
        }
    }

    pub fn monthly_trend(daily: &DataFrame) -> Result<MonthlyTrend, AggregateError> {
        let summary = Aggregator::aggregate(daily, &["yr", "mnth"], "cnt", &[Statistic::Sum])?;
        MonthlyTrend::from_summary(&summary, "cnt_sum")
    }

    /// Label seasons on a copy of the table, then total usage per season.
    pub fn season_totals(
        daily: &DataFrame,
        diagnostics: &mut Diagnostics,
    ) -> Result<SeasonTotals, AggregateError> {
        let (labelled, outcome) = LabelMapper::map_column(daily, "season", &SEASON)?;
        if outcome.has_misses() {
            diagnostics.warn(outcome.describe_misses());
        }

        let summary = Aggregator::aggregate(&labelled, &["season"], "cnt", &[Statistic::Sum])?;
        SeasonTotals::from_summary(summary, "cnt_sum")
    }

    fn trend_notes(trend: &MonthlyTrend) -> Vec<String> {
        let mut notes = Vec::new();

        if let [first, second, ..] = trend.series.as_slice() {
            let higher = second
                .points
                .iter()
                .filter(|p| {
                    first
                        .points
                        .iter()
                        .find(|q| q.x == p.x)
                        .is_some_and(|q| p.value > q.value)
                })
                .count();
            notes.push(format!(
                "Rentals in {} exceed {} in {} of {} months, pointing to growing demand for the service.",
                second.name,
                first.name,
                higher,
                second.points.len()
            ));
        }

        notes.push(
            "Rentals climb from January, peak between June and September and fall again toward the end of the year. \
             Both years follow the same shape, so season and weather drive the number of rentals."
                .to_string(),
        );
        notes
    }

    fn season_notes(totals: &SeasonTotals) -> Vec<String> {
        let mut notes = Vec::new();
        if let Some(peak) = totals.peak() {
            notes.push(format!(
                "{} has the most rentals with {} in total.",
                peak.label,
                format_value(peak.total)
            ));
        }
        notes.push(
            "Likely reasons: weather that favors outdoor activity, longer days, and holidays that increase mobility."
                .to_string(),
        );
        notes
    }
}

impl AdvancedView {
    pub const HEATMAP_COLUMNS: [&'static str; 3] = ["weekday", "hr", "cnt"];

    pub fn build(dataset: &Dataset) -> Self {
        let mut diagnostics = Diagnostics::new();

        let heatmap = if check_columns(&dataset.hourly, &Self::HEATMAP_COLUMNS, &mut diagnostics) {
            Self::heatmap(&dataset.hourly)
                .map_err(|e| diagnostics.error(format!("Heatmap failed: {}", e)))
                .ok()
        } else {
            None
        };

        Self {
            heatmap,
            heatmap_notes: vec![
                "1. Rentals peak at 7-9 in the morning and 17-19 in the evening on working days (Monday to Friday).".to_string(),
                "2. On weekends usage spreads more evenly across the day, rising from midday into the afternoon.".to_string(),
            ],
            diagnostics,
        }
    }

    /// Summed usage with weekdays as rows and hours as columns.
    pub fn heatmap(hourly: &DataFrame) -> Result<HeatmapGrid, AggregateError> {
        let matrix = Aggregator::aggregate(hourly, &["weekday", "hr"], "cnt", &[Statistic::Sum])?
            .unstack("cnt_sum")?;
        Ok(HeatmapGrid::from_matrix(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(daily: DataFrame, hourly: DataFrame) -> Dataset {
        Dataset {
            daily,
            hourly,
            mapping_outcomes: Vec::new(),
        }
    }

    fn hourly() -> DataFrame {
        df!(
            "dteday" => &["2011-01-01", "2011-01-01", "2011-07-01"],
            "season" => &[1i64, 1, 3],
            "hr" => &[0i64, 1, 0],
            "weekday" => &[6i64, 6, 5],
            "cnt" => &[16i64, 40, 300]
        )
        .unwrap()
    }

    fn daily() -> DataFrame {
        df!(
            "yr" => &["2011", "2011", "2012"],
            "mnth" => &["January", "July", "January"],
            "season" => &[1i64, 3, 1],
            "cnt" => &[100i64, 900, 250]
        )
        .unwrap()
    }

    #[test]
    fn page_titles_are_distinct() {
        let titles: Vec<&str> = Page::ALL.iter().map(|p| p.title()).collect();
        assert_eq!(
            titles,
            vec!["Exploratory Summary", "Visualization", "Advanced Analysis"]
        );
    }

    #[test]
    fn build_page_dispatches_to_selected_page() {
        let data = dataset(daily(), hourly());
        for page in Page::ALL {
            assert_eq!(build_page(page, &data).page(), page);
        }
    }

    #[test]
    fn summary_page_has_seasonal_table() {
        let view = SummaryView::build(&dataset(daily(), hourly()));

        assert!(view.diagnostics.is_empty());
        assert_eq!(view.raw_daily.rows.len(), 3);
        assert_eq!(view.raw_daily.headers[0], "yr");

        let seasonal = view.seasonal.unwrap();
        assert_eq!(
            seasonal.value_columns,
            vec!["dteday_nunique", "cnt_max", "cnt_min", "cnt_mean", "cnt_std"]
        );
        let winter = &seasonal.rows[0].values;
        assert_eq!(winter[..4], [Some(1.0), Some(40.0), Some(16.0), Some(28.0)]);
        assert!((winter[4].unwrap() - 288f64.sqrt()).abs() < 1e-9);
        // Summer has a single hour
        assert_eq!(seasonal.rows[1].values[4], None);
        assert!(view.seasonal_notes[1].contains("season 3 (Summer)"));
    }

    #[test]
    fn summary_page_reports_mapping_misses() {
        let mut data = dataset(daily(), hourly());
        let mut outcome = crate::data::MappingOutcome {
            column: "yr".to_string(),
            ..Default::default()
        };
        outcome.unmapped.insert(2, 5);
        data.mapping_outcomes.push(outcome);

        let view = SummaryView::build(&data);
        assert_eq!(view.diagnostics.items().len(), 1);
        assert!(!view.diagnostics.has_errors());
    }

    #[test]
    fn missing_columns_skip_only_the_affected_chart() {
        let daily = df!("yr" => &["2011"], "season" => &[1i64], "cnt" => &[5i64]).unwrap();
        let view = VisualizationView::build(&dataset(daily, hourly()));

        assert!(view.monthly_trend.is_none());
        assert!(view.season_totals.is_some());
        assert_eq!(
            view.diagnostics.items()[0].message,
            r#"Missing columns: ["mnth"]"#
        );
    }

    #[test]
    fn visualization_labels_seasons_per_render() {
        let data = dataset(daily(), hourly());
        let view = VisualizationView::build(&data);

        let totals = view.season_totals.unwrap();
        assert_eq!(totals.bars[0].label, "Summer");
        assert_eq!(totals.bars[0].total, 900.0);
        assert_eq!(totals.bars[1].label, "Winter");
        assert_eq!(totals.bars[1].total, 350.0);
        // Cached table keeps its codes
        assert!(data.daily.column("season").unwrap().dtype().is_integer());
        assert!(view.season_notes[0].starts_with("Summer has the most rentals"));
        assert!(view.trend_notes[0].contains("1 of 1 months"));
    }

    #[test]
    fn unmapped_season_code_passes_through_with_warning() {
        let daily = df!(
            "yr" => &["2011", "2011"],
            "mnth" => &["January", "February"],
            "season" => &[1i64, 7],
            "cnt" => &[100i64, 40]
        )
        .unwrap();
        let view = VisualizationView::build(&dataset(daily, hourly()));

        let items = view.diagnostics.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, crate::diagnostics::Severity::Warning);
        assert_eq!(
            items[0].message,
            "Column 'season' has codes without a label: 7 (1 rows)"
        );

        let totals = view.season_totals.unwrap();
        let unknown = totals.bars.iter().find(|b| b.label == "7").unwrap();
        assert_eq!(unknown.total, 40.0);
        assert_eq!(unknown.color, crate::charts::NEUTRAL);
        assert_eq!(totals.bars[0].label, "Winter");
    }

    #[test]
    fn advanced_page_without_hour_column_has_no_heatmap() {
        let hourly = df!("weekday" => &[0i64], "cnt" => &[1i64]).unwrap();
        let view = AdvancedView::build(&dataset(daily(), hourly));

        assert!(view.heatmap.is_none());
        assert!(view.diagnostics.has_errors());
        assert!(!view.heatmap_notes.is_empty());
    }
}
