//! Statistics module - descriptive statistics and group aggregation

mod aggregate;
mod calculator;

pub use aggregate::{
    AggregateError, AggregatedSummary, Aggregator, KeyValue, Matrix, NamedAgg, Statistic,
    SummaryRow,
};
pub use calculator::{
    format_optional, format_value, ColumnKind, ColumnSummary, DescribeTable, NumericSummary,
    StatsCalculator, MISSING,
};
