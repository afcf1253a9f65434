//! Market-analysis agent
//!
//! Works purely from candles fetched through `MarketDataPort`. All of
//! the heuristics here are deliberately simple moving-average and
//! swing-point reads; the value is the uniform contract, not the math.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{AgentResponse, Candle, ExecutionContext, MarketDataPort};

const DEFAULT_LOOKBACK: usize = 120;

pub struct AnalysisAgent {
    market: Arc<dyn MarketDataPort>,
    capabilities: Vec<Capability>,
}

impl AnalysisAgent {
    pub fn new(market: Arc<dyn MarketDataPort>) -> Self {
        let params = vec![
            ParameterSpec::optional("symbol", ParameterKind::String),
            ParameterSpec::optional("timeframe", ParameterKind::String),
        ];
        Self {
            market,
            capabilities: vec![
                Capability::new("analyze-chart", "Summarize trend and momentum for a symbol")
                    .with_params(params.clone()),
                Capability::new("detect-signals", "Scan recent candles for crossover signals")
                    .with_params(params.clone()),
                Capability::new(
                    "support-resistance",
                    "Estimate support and resistance levels from recent swings",
                )
                .with_params(params),
            ],
        }
    }

    /// Symbol comes from the action parameters first, then the session
    /// context. No symbol anywhere is a failure, not a default.
    fn resolve_symbol(ctx: &ExecutionContext, params: &Value) -> Result<String, AgentResponse> {
        params["symbol"]
            .as_str()
            .map(str::to_string)
            .or_else(|| ctx.symbol.clone())
            .ok_or_else(|| {
                AgentResponse::failure(
                    "no symbol in parameters or session context",
                    "analysis requires a symbol",
                )
            })
    }

    fn resolve_timeframe(ctx: &ExecutionContext, params: &Value) -> String {
        params["timeframe"]
            .as_str()
            .map(str::to_string)
            .or_else(|| ctx.timeframe.clone())
            .unwrap_or_else(|| "1D".to_string())
    }

    async fn fetch(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Vec<Candle>, AgentResponse> {
        let candles = self
            .market
            .candles(symbol, timeframe, DEFAULT_LOOKBACK)
            .await
            .map_err(|e| AgentResponse::failure(e.to_string(), "market data fetch failed"))?;
        if candles.len() < 2 {
            return Err(AgentResponse::failure(
                format!("not enough candles for {symbol} on {timeframe}"),
                "insufficient market data",
            ));
        }
        Ok(candles)
    }

    async fn analyze_chart(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let symbol = match Self::resolve_symbol(ctx, params) {
            Ok(s) => s,
            Err(r) => return r,
        };
        let timeframe = Self::resolve_timeframe(ctx, params);
        let candles = match self.fetch(&symbol, &timeframe).await {
            Ok(c) => c,
            Err(r) => return r,
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let last = closes[closes.len() - 1];
        let short = sma(&closes, 10);
        let long = sma(&closes, 30);

        let trend = match (short, long) {
            (Some(s), Some(l)) if s > l * 1.001 => "bullish",
            (Some(s), Some(l)) if s < l * 0.999 => "bearish",
            _ => "sideways",
        };

        let change = (last - closes[0]) / closes[0] * 100.0;

        AgentResponse::success(
            json!({
                "symbol": symbol,
                "timeframe": timeframe,
                "last_price": last,
                "trend": trend,
                "change_pct": (change * 100.0).round() / 100.0,
                "sma_10": short,
                "sma_30": long,
                "candles": candles.len(),
            }),
            format!("{symbol} looks {trend} on {timeframe}"),
        )
    }

    async fn detect_signals(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let symbol = match Self::resolve_symbol(ctx, params) {
            Ok(s) => s,
            Err(r) => return r,
        };
        let timeframe = Self::resolve_timeframe(ctx, params);
        let candles = match self.fetch(&symbol, &timeframe).await {
            Ok(c) => c,
            Err(r) => return r,
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let mut signals = Vec::new();

        // fast/slow SMA crossover over the last two bars
        if closes.len() > 31 {
            let prev = &closes[..closes.len() - 1];
            let fast_now = sma(&closes, 10);
            let slow_now = sma(&closes, 30);
            let fast_prev = sma(prev, 10);
            let slow_prev = sma(prev, 30);
            if let (Some(f1), Some(s1), Some(f0), Some(s0)) =
                (fast_now, slow_now, fast_prev, slow_prev)
            {
                if f0 <= s0 && f1 > s1 {
                    signals.push(json!({"kind": "golden-cross", "fast": 10, "slow": 30}));
                } else if f0 >= s0 && f1 < s1 {
                    signals.push(json!({"kind": "death-cross", "fast": 10, "slow": 30}));
                }
            }
        }

        let last = candles[candles.len() - 1];
        let range = last.high - last.low;
        if range > 0.0 && (last.close - last.low) / range > 0.9 {
            signals.push(json!({"kind": "strong-close", "position": "high"}));
        } else if range > 0.0 && (last.close - last.low) / range < 0.1 {
            signals.push(json!({"kind": "strong-close", "position": "low"}));
        }

        let count = signals.len();
        AgentResponse::success(
            json!({ "symbol": symbol, "timeframe": timeframe, "signals": signals }),
            format!("{count} signals detected"),
        )
    }

    async fn support_resistance(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let symbol = match Self::resolve_symbol(ctx, params) {
            Ok(s) => s,
            Err(r) => return r,
        };
        let timeframe = Self::resolve_timeframe(ctx, params);
        let candles = match self.fetch(&symbol, &timeframe).await {
            Ok(c) => c,
            Err(r) => return r,
        };

        let mut supports = Vec::new();
        let mut resistances = Vec::new();
        // local swing points over a 2-bar neighborhood
        for w in candles.windows(5) {
            let mid = w[2];
            if w.iter().all(|c| c.low >= mid.low) {
                supports.push(mid.low);
            }
            if w.iter().all(|c| c.high <= mid.high) {
                resistances.push(mid.high);
            }
        }
        supports.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        resistances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        supports.truncate(3);
        resistances.truncate(3);

        AgentResponse::success(
            json!({
                "symbol": symbol,
                "timeframe": timeframe,
                "support": supports,
                "resistance": resistances,
            }),
            format!("levels computed for {symbol}"),
        )
    }
}

/// Simple moving average of the trailing `period` values
fn sma(values: &[f64], period: usize) -> Option<f64> {
    if values.len() < period || period == 0 {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

#[async_trait]
impl Agent for AnalysisAgent {
    fn name(&self) -> &str {
        "analysis"
    }

    fn description(&self) -> &str {
        "Computes trend, signal, and level summaries from market data"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, params: &Value) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "analyze-chart" => self.analyze_chart(ctx, params).await,
            "detect-signals" => self.detect_signals(ctx, params).await,
            "support-resistance" => self.support_resistance(ctx, params).await,
            other => AgentResponse::failure(
                format!("unsupported action: {other}"),
                "action is not part of this agent's capabilities",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::market::StaticMarketData;
    use serde_json::json;

    fn agent() -> AnalysisAgent {
        AnalysisAgent::new(Arc::new(StaticMarketData::new()))
    }

    #[tokio::test]
    async fn analyze_requires_a_symbol() {
        let response = agent()
            .execute(&ExecutionContext::default(), "analyze-chart", &Value::Null)
            .await;
        assert!(!response.is_success());
        assert!(response.error().unwrap().contains("symbol"));
    }

    #[tokio::test]
    async fn analyze_uses_context_symbol() {
        let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
        let response = agent().execute(&ctx, "analyze-chart", &Value::Null).await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["symbol"], "AAPL");
        assert!(data["trend"].as_str().is_some());
    }

    #[tokio::test]
    async fn params_symbol_overrides_context() {
        let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
        let response = agent()
            .execute(&ctx, "support-resistance", &json!({"symbol": "TSLA"}))
            .await;

        assert!(response.is_success());
        assert_eq!(response.data().unwrap()["symbol"], "TSLA");
    }

    #[test]
    fn sma_needs_enough_values() {
        assert_eq!(sma(&[1.0, 2.0, 3.0], 4), None);
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
    }
}
