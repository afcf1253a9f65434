//! # Navis - chart command orchestration engine
//!
//! Navis turns free-text chart commands into action plans and runs
//! multi-agent workflows against a market-data dashboard. It provides a
//! capability registry of agents, a heuristic command parser, and
//! sequential/parallel workflow execution with partial-failure
//! reporting.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use navis::adapters::{InMemoryChart, StaticMarketData};
//! use navis::config::Settings;
//! use navis::domain::ExecutionContext;
//! use navis::orchestrator::Orchestrator;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Arc::new(Settings::new()?);
//!     let registry = navis::default_registry(
//!         Arc::new(InMemoryChart::new()),
//!         Arc::new(StaticMarketData::new()),
//!     );
//!     let orchestrator = Orchestrator::new(registry, settings);
//!
//!     let ctx = ExecutionContext::new("session-1").with_symbol("AAPL");
//!     let response = orchestrator
//!         .handle(&ctx, "process-chart-command",
//!                 &json!({"command": "switch to 5m and add ema 9 and 20"}))
//!         .await;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: core types (plans, responses, context) and the chart
//!   and market-data port boundaries
//! - **Agents**: the uniform agent contract and the six concrete agents
//! - **Parser**: free text to action plan
//! - **Orchestrator**: workflow executor, plan dispatch, call surface
//! - **Adapters**: in-memory implementations of the port boundaries

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod parser;

use std::sync::Arc;

use crate::agents::alert::AlertAgent;
use crate::agents::analysis::AnalysisAgent;
use crate::agents::chart::ChartControlAgent;
use crate::agents::critique::CritiqueAgent;
use crate::agents::strategy::StrategyAgent;
use crate::agents::trading::TradingAgent;
use crate::agents::AgentRegistry;
use crate::domain::{ChartPort, MarketDataPort};

/// Build a registry populated with the full standard agent set, wired
/// to the given port implementations.
pub fn default_registry(
    chart: Arc<dyn ChartPort>,
    market: Arc<dyn MarketDataPort>,
) -> Arc<AgentRegistry> {
    let registry = Arc::new(AgentRegistry::new());
    registry.register(Arc::new(ChartControlAgent::new(chart)));
    registry.register(Arc::new(AnalysisAgent::new(market)));
    registry.register(Arc::new(StrategyAgent::new()));
    registry.register(Arc::new(TradingAgent::new()));
    registry.register(Arc::new(AlertAgent::new()));
    registry.register(Arc::new(CritiqueAgent::new()));
    registry
}
