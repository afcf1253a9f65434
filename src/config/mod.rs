use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;
use crate::error::{EngineError, EngineResult};

/// Top-level engine configuration, loaded from `navis.toml` plus CLI
/// overrides. Every section has defaults so the binary runs with no
/// config file at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default execution mode for `execute-workflow` when the caller
    /// does not specify one
    pub default_mode: crate::domain::ExecutionMode,
    /// Character window scanned around an indicator mention for numeric
    /// parameters
    pub parameter_window: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_mode: crate::domain::ExecutionMode::Sequential,
            parameter_window: 24,
        }
    }
}

/// Static capability catalogue: indicator metadata, valid timeframes,
/// valid chart types, and the color palette the parser recognizes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub timeframes: Vec<String>,
    pub chart_types: Vec<String>,
    pub colors: Vec<String>,
    pub indicators: Vec<IndicatorSpec>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            timeframes: default_timeframes(),
            chart_types: default_chart_types(),
            colors: default_colors(),
            indicators: default_indicators(),
        }
    }
}

/// Catalogue entry for one indicator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndicatorSpec {
    /// Canonical name, e.g. "BOLL"
    pub name: String,
    /// Free-text synonyms the parser resolves to this indicator
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Calculation parameters used when a command names no numbers
    #[serde(default)]
    pub default_params: Vec<u32>,
    /// Whether the indicator is conventionally drawn on the price pane
    #[serde(default)]
    pub overlay: bool,
}

impl IndicatorSpec {
    fn new(name: &str, synonyms: &[&str], default_params: &[u32], overlay: bool) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            default_params: default_params.to_vec(),
            overlay,
        }
    }
}

fn default_timeframes() -> Vec<String> {
    ["1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "1D", "1W", "1M"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_chart_types() -> Vec<String> {
    ["candle", "line", "area"].iter().map(|s| s.to_string()).collect()
}

fn default_colors() -> Vec<String> {
    [
        "red", "green", "blue", "orange", "purple", "yellow", "white", "black", "gray", "cyan",
        "magenta", "pink",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        IndicatorSpec::new("MA", &["moving average"], &[5, 10, 30, 60], true),
        IndicatorSpec::new("EMA", &["exponential moving average"], &[6, 12, 20], true),
        IndicatorSpec::new("BOLL", &["bollinger", "bollinger bands", "bb"], &[20], true),
        IndicatorSpec::new("SAR", &["parabolic sar"], &[2, 2, 20], true),
        IndicatorSpec::new("BBI", &[], &[3, 6, 12, 24], true),
        IndicatorSpec::new("VOL", &["volume"], &[5, 10, 20], false),
        IndicatorSpec::new("MACD", &[], &[12, 26, 9], false),
        IndicatorSpec::new("KDJ", &["stochastic", "stoch"], &[9, 3, 3], false),
        IndicatorSpec::new("RSI", &["relative strength index"], &[6, 12, 24], false),
        IndicatorSpec::new("WR", &["williams %r", "williams r"], &[6, 10, 14], false),
        IndicatorSpec::new("CCI", &[], &[13], false),
        IndicatorSpec::new("DMI", &["adx"], &[14, 6], false),
        IndicatorSpec::new("TRIX", &[], &[12, 20], false),
        IndicatorSpec::new("OBV", &["on balance volume"], &[30], false),
        IndicatorSpec::new("EMV", &[], &[14, 9], false),
        IndicatorSpec::new("MTM", &["momentum"], &[6, 10], false),
        IndicatorSpec::new("PSY", &[], &[12, 6], false),
        IndicatorSpec::new("BRAR", &[], &[26], false),
        IndicatorSpec::new("CR", &[], &[26, 10, 20, 40, 60], false),
        IndicatorSpec::new("VR", &[], &[24, 30], false),
        IndicatorSpec::new("ROC", &["rate of change"], &[12, 6], false),
        IndicatorSpec::new("PVT", &[], &[], false),
        IndicatorSpec::new("AO", &["awesome oscillator"], &[5, 34], false),
    ]
}

impl Settings {
    pub fn new() -> EngineResult<Self> {
        Self::from_file(Path::new("navis.toml"))
    }

    /// Create settings from CLI arguments
    pub fn new_with_cli(cli: &Cli) -> EngineResult<Self> {
        Self::from_file(&cli.config)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let s = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        validator::ConfigValidator::validate(&settings).map_err(EngineError::Validation)?;

        Ok(settings)
    }
}
