//! Charts module - chart models, interactive plots and static rendering

mod model;
mod plotter;
mod renderer;

pub use model::{
    season_color, series_color, ylgnbu, HeatmapGrid, MonthlyTrend, Rgb, SeasonBar,
    SeasonTotals, TrendPoint, TrendSeries, NEUTRAL,
};
pub use plotter::{to_color32, ChartPlotter};
pub use renderer::StaticChartRenderer;
