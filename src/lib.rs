//! Bike-share dashboard core: table loading, label mapping, aggregation,
//! page models and chart rendering.

pub mod charts;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod export;
pub mod stats;
pub mod views;
