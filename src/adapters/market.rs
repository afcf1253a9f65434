//! Deterministic synthetic market data
//!
//! Candles are generated from a hash of the symbol so the same symbol
//! always produces the same series. Good enough to exercise the
//! analysis heuristics; no external feed, no randomness.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::domain::{Candle, MarketDataPort};

pub struct StaticMarketData;

impl StaticMarketData {
    pub fn new() -> Self {
        Self
    }

    fn series(symbol: &str, limit: usize) -> Vec<Candle> {
        let mut hasher = DefaultHasher::new();
        symbol.to_uppercase().hash(&mut hasher);
        let seed = hasher.finish();

        let base = 50.0 + (seed % 400) as f64;
        let mut candles = Vec::with_capacity(limit);
        let mut close = base;

        for i in 0..limit {
            // bounded pseudo-walk derived from the seed, plus a slow
            // drift so trends exist
            let wobble = (((seed >> (i % 48)) & 0xff) as f64 - 127.5) / 127.5;
            let drift = (i as f64 / limit.max(1) as f64 - 0.5) * 0.004 * base;
            let open = close;
            close = (open + wobble * base * 0.01 + drift).max(1.0);
            let high = open.max(close) * 1.005;
            let low = open.min(close) * 0.995;
            let volume = 1_000.0 + ((seed >> (i % 32)) & 0xffff) as f64;
            candles.push(Candle {
                timestamp: 1_700_000_000 + (i as i64) * 60,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        candles
    }
}

impl Default for StaticMarketData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataPort for StaticMarketData {
    async fn candles(
        &self,
        symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Candle>> {
        Ok(Self::series(symbol, limit))
    }

    async fn last_price(&self, symbol: &str) -> anyhow::Result<Option<f64>> {
        Ok(Self::series(symbol, 2).last().map(|c| c.close))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn series_is_deterministic_per_symbol() {
        let market = StaticMarketData::new();
        let a = market.candles("AAPL", "1D", 50).await.unwrap();
        let b = market.candles("aapl", "1h", 50).await.unwrap();
        let c = market.candles("TSLA", "1D", 50).await.unwrap();

        assert_eq!(a.len(), 50);
        assert_eq!(a[10].close, b[10].close);
        assert_ne!(a[10].close, c[10].close);
    }

    #[tokio::test]
    async fn candles_are_well_formed() {
        let market = StaticMarketData::new();
        for candle in market.candles("AAPL", "1D", 120).await.unwrap() {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
            assert!(candle.close > 0.0);
        }
    }

    #[tokio::test]
    async fn last_price_matches_final_candle() {
        let market = StaticMarketData::new();
        let price = market.last_price("AAPL").await.unwrap();
        assert!(price.is_some());
    }
}
