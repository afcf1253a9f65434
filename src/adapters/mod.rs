//! In-process adapters for the chart and market-data boundaries

pub mod chart;
pub mod market;

pub use chart::InMemoryChart;
pub use market::StaticMarketData;
