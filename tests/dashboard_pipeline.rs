use bikeshare_dashboard::data::labels::SEASON;
use bikeshare_dashboard::data::{DataLoader, DataPaths, LabelMapper};
use bikeshare_dashboard::stats::{Aggregator, KeyValue, Statistic};
use bikeshare_dashboard::views::{build_page, AdvancedView, Page, PageView, VisualizationView};
use polars::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DAILY_HEADER: &str =
    "instant,dteday,season,yr,mnth,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt";
const HOURLY_HEADER: &str =
    "instant,dteday,season,yr,mnth,hr,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt";

fn season_of(month: i64) -> i64 {
    (month % 12) / 3 + 1
}

/// One row per month for both years.
fn daily_csv() -> String {
    let mut lines = vec![DAILY_HEADER.to_string()];
    let mut instant = 1;
    for yr in 0..2i64 {
        for mnth in 1..=12i64 {
            let cnt = 1000 * (yr + 1) + 10 * mnth;
            lines.push(format!(
                "{},{}-{:02}-01,{},{},{},0,{},1,1,0.5,0.48,0.6,0.2,{},{},{}",
                instant,
                2011 + yr,
                mnth,
                season_of(mnth),
                yr,
                mnth,
                instant % 7,
                cnt / 4,
                cnt - cnt / 4,
                cnt
            ));
            instant += 1;
        }
    }
    lines.join("\n")
}

/// A full Sunday and a partial Monday, spread over two seasons.
fn hourly_csv() -> String {
    let mut lines = vec![HOURLY_HEADER.to_string()];
    let mut instant = 1;
    for (weekday, day, season, hours) in [(0i64, "2011-01-02", 1i64, 24i64), (1, "2011-07-04", 3, 6)] {
        for hr in 0..hours {
            let cnt = (hr + 1) * (weekday + 1);
            lines.push(format!(
                "{},{},{},0,1,{},0,{},{},1,0.3,0.3,0.5,0.1,1,{},{}",
                instant,
                day,
                season,
                hr,
                weekday,
                weekday,
                cnt - 1,
                cnt
            ));
            instant += 1;
        }
    }
    lines.join("\n")
}

fn write_fixture(dir: &Path, daily: &str, hourly: &str) -> DataPaths {
    let paths = DataPaths {
        daily: dir.join("day.csv"),
        hourly: dir.join("hour.csv"),
    };
    fs::write(&paths.daily, daily).unwrap();
    fs::write(&paths.hourly, hourly).unwrap();
    paths
}

fn loader() -> (TempDir, DataLoader) {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixture(dir.path(), &daily_csv(), &hourly_csv());
    (dir, DataLoader::new(paths))
}

#[test]
fn reload_returns_cached_tables() {
    let (_dir, loader) = loader();

    let first = loader.load().unwrap();
    let second = loader.load().unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.daily.height(), 24);
    assert_eq!(first.hourly.height(), 30);
    assert_eq!(first.daily.get_column_names(), second.daily.get_column_names());
    assert_eq!(first.hourly.width(), 17);
}

#[test]
fn monthly_trend_has_one_point_per_year_and_month() {
    let (_dir, loader) = loader();
    let dataset = loader.load().unwrap();

    let trend = VisualizationView::monthly_trend(&dataset.daily).unwrap();

    assert_eq!(trend.point_count(), 24);
    assert_eq!(trend.series.len(), 2);
    assert_eq!(trend.series[0].name, "2011");
    assert_eq!(trend.series[1].name, "2012");
    assert_eq!(trend.categories[0], "January");
    assert_eq!(trend.series[1].points[11].value, 2120.0);
}

#[test]
fn heatmap_row_covers_every_hour() {
    let (_dir, loader) = loader();
    let dataset = loader.load().unwrap();

    let grid = AdvancedView::heatmap(&dataset.hourly).unwrap();

    assert_eq!(grid.row_labels, vec!["Sunday", "Monday"]);
    assert_eq!(grid.col_labels.len(), 24);
    let sunday = &grid.cells[0];
    assert_eq!(sunday.len(), 24);
    assert!(sunday.iter().all(Option::is_some));
    assert_eq!(sunday[23], Some(24.0));
    // Monday only has the first six hours
    assert_eq!(grid.cells[1][5], Some(12.0));
    assert_eq!(grid.cells[1][6], None);
}

#[test]
fn season_sums_match_manual_sums() {
    let (_dir, loader) = loader();
    let dataset = loader.load().unwrap();

    let summary =
        Aggregator::aggregate(&dataset.hourly, &["season"], "cnt", &[Statistic::Sum]).unwrap();

    let winter: f64 = (1..=24).map(|h| h as f64).sum();
    let summer: f64 = (1..=6).map(|h| 2.0 * h as f64).sum();
    assert_eq!(summary.get(&[KeyValue::Code(1)], "cnt_sum"), Some(winter));
    assert_eq!(summary.get(&[KeyValue::Code(3)], "cnt_sum"), Some(summer));
    assert_eq!(summary.len(), 2);
}

#[test]
fn season_code_one_is_winter() {
    assert_eq!(SEASON.label(1), Some("Winter"));

    let df = df!("season" => &[1i64, 4]).unwrap();
    let (mapped, outcome) = LabelMapper::map_column(&df, "season", &SEASON).unwrap();
    let labels: Vec<Option<&str>> = mapped
        .column("season")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(labels, vec![Some("Winter"), Some("Fall")]);
    assert!(!outcome.has_misses());
}

#[test]
fn missing_column_skips_chart_but_not_page() {
    let dir = tempfile::tempdir().unwrap();
    let hourly = hourly_csv().replacen(",hr,", ",hour,", 1);
    let paths = write_fixture(dir.path(), &daily_csv(), &hourly);
    let dataset = DataLoader::new(paths).load().unwrap();

    let PageView::Advanced(view) = build_page(Page::Advanced, &dataset) else {
        panic!("expected the advanced page");
    };

    assert!(view.heatmap.is_none());
    assert_eq!(
        view.diagnostics.items()[0].message,
        r#"Missing columns: ["hr"]"#
    );

    // The summary page is unaffected
    let summary = build_page(Page::Summary, &dataset);
    assert!(!summary.diagnostics().has_errors());
}

#[test]
fn visualization_page_orders_seasons_by_total() {
    let (_dir, loader) = loader();
    let dataset = loader.load().unwrap();

    let PageView::Visualization(view) = build_page(Page::Visualization, &dataset) else {
        panic!("expected the visualization page");
    };

    let totals = view.season_totals.unwrap();
    let labels: Vec<&str> = totals.bars.iter().map(|b| b.label.as_str()).collect();
    // Fall holds September to November, the largest months in the fixture
    assert_eq!(labels[0], "Fall");
    assert_eq!(labels.len(), 4);
    assert!(totals.bars.windows(2).all(|w| w[0].total >= w[1].total));
    assert!(view.diagnostics.is_empty());
}

#[test]
fn missing_file_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let loader = DataLoader::new(DataPaths {
        daily: dir.path().join("missing.csv"),
        hourly: dir.path().join("hour.csv"),
    });

    assert!(loader.load().is_err());
    assert!(!loader.is_loaded());
}
