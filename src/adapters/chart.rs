//! In-memory chart surface
//!
//! Stands in for the live dashboard bridge: applies actions to a held
//! `ChartState` and hands out numbered screenshot references.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ChartAction, ChartPort, ChartState};

pub struct InMemoryChart {
    state: RwLock<ChartState>,
    screenshots: AtomicUsize,
}

impl InMemoryChart {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ChartState::default()),
            screenshots: AtomicUsize::new(0),
        }
    }

    pub fn with_state(state: ChartState) -> Self {
        Self {
            state: RwLock::new(state),
            screenshots: AtomicUsize::new(0),
        }
    }
}

impl Default for InMemoryChart {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartPort for InMemoryChart {
    async fn apply(&self, actions: &[ChartAction]) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        for action in actions {
            match action {
                ChartAction::SetTimeframe { timeframe } => {
                    state.timeframe = Some(timeframe.clone());
                }
                ChartAction::SetChartType { chart_type } => {
                    state.chart_type = Some(chart_type.clone());
                }
                ChartAction::AddIndicator { name, .. } => {
                    if !state
                        .indicators
                        .iter()
                        .any(|i| i.eq_ignore_ascii_case(name))
                    {
                        state.indicators.push(name.clone());
                    }
                }
                ChartAction::RemoveIndicator { name } => {
                    state.indicators.retain(|i| !i.eq_ignore_ascii_case(name));
                }
                ChartAction::Navigate { .. } | ChartAction::ToggleOption { .. } => {
                    // viewport and display options are not part of the
                    // read-back state
                }
            }
        }
        Ok(())
    }

    async fn capture_screenshot(&self) -> anyhow::Result<String> {
        let n = self.screenshots.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("screenshot-{n}.png"))
    }

    async fn current_state(&self) -> anyhow::Result<ChartState> {
        Ok(self.state.read().await.clone())
    }
}
