//! Core domain types and collaborator ports
//!
//! The engine never touches the chart surface or market data directly;
//! everything goes through the `ChartPort` and `MarketDataPort` seams so
//! the live dashboard, a remote bridge, or an in-memory fake can stand
//! behind them interchangeably.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod context;
pub mod plan;
pub mod response;
pub mod workflow;

pub use catalog::CapabilityCatalog;
pub use context::ExecutionContext;
pub use plan::{ActionPlan, ToolCall, PLAN_VERSION};
pub use response::{AgentResponse, WorkflowResult};
pub use workflow::{ExecutionMode, WorkflowStep};

/// Navigation directions understood by the chart surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavDirection {
    Left,
    Right,
    ZoomIn,
    ZoomOut,
}

impl std::fmt::Display for NavDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavDirection::Left => write!(f, "left"),
            NavDirection::Right => write!(f, "right"),
            NavDirection::ZoomIn => write!(f, "zoom-in"),
            NavDirection::ZoomOut => write!(f, "zoom-out"),
        }
    }
}

impl std::str::FromStr for NavDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(NavDirection::Left),
            "right" => Ok(NavDirection::Right),
            "zoom-in" => Ok(NavDirection::ZoomIn),
            "zoom-out" => Ok(NavDirection::ZoomOut),
            other => Err(format!("invalid navigation direction: {other}")),
        }
    }
}

/// A primitive mutation applied to the chart surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartAction {
    SetTimeframe {
        timeframe: String,
    },
    SetChartType {
        chart_type: String,
    },
    AddIndicator {
        name: String,
        params: Vec<u32>,
        overlay: bool,
    },
    RemoveIndicator {
        name: String,
    },
    Navigate {
        direction: NavDirection,
    },
    ToggleOption {
        option: String,
        enabled: bool,
    },
}

/// Read-back of the live chart surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartState {
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub chart_type: Option<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub last_price: Option<f64>,
}

/// Boundary to the chart-mutation collaborator
#[async_trait]
pub trait ChartPort: Send + Sync {
    /// Apply a batch of primitive actions to the live chart
    async fn apply(&self, actions: &[ChartAction]) -> anyhow::Result<()>;

    /// Capture a screenshot, returning an opaque reference to it
    async fn capture_screenshot(&self) -> anyhow::Result<String>;

    /// Read back the current chart state
    async fn current_state(&self) -> anyhow::Result<ChartState>;
}

/// One OHLCV bar
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Boundary to the market-data collaborator
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Most recent candles for a symbol, oldest first
    async fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Candle>>;

    /// Last traded price, if known
    async fn last_price(&self, symbol: &str) -> anyhow::Result<Option<f64>>;
}
