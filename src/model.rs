use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of history provider serves an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Chart,
    Gold,
}

impl SourceKind {
    /// Parse a config-format string into a `SourceKind`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "chart" => Some(Self::Chart),
            "gold" => Some(Self::Gold),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One daily price/volume observation.
///
/// Only close and volume are required by the analysis core; open/high/low
/// are pass-through when the provider supplies them.
#[derive(Debug, Clone)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: f64,
}

/// Candle history as returned by a provider: a status marker plus parallel
/// arrays in ascending time order. Arrays other than `closes` may be empty.
#[derive(Debug, Clone, Default)]
pub struct RawHistory {
    pub status: String,
    // Timestamp/OHLC pass-through, not consumed by the analysis core
    #[allow(dead_code)]
    pub timestamps: Vec<i64>,
    #[allow(dead_code)]
    pub opens: Vec<f64>,
    #[allow(dead_code)]
    pub highs: Vec<f64>,
    #[allow(dead_code)]
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl RawHistory {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Assemble a history from already-parsed candles (row-based providers).
    pub fn from_candles(status: &str, candles: &[Candle]) -> Self {
        Self {
            status: status.to_owned(),
            timestamps: candles.iter().map(|c| c.timestamp.timestamp()).collect(),
            opens: candles.iter().filter_map(|c| c.open).collect(),
            highs: candles.iter().filter_map(|c| c.high).collect(),
            lows: candles.iter().filter_map(|c| c.low).collect(),
            closes: candles.iter().map(|c| c.close).collect(),
            volumes: candles.iter().map(|c| c.volume).collect(),
        }
    }
}

/// Cleaned numeric series the indicator pipeline runs on.
///
/// Closes are time-ascending and finite; volumes are parallel but may be
/// shorter (or empty) when the provider reports none.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd_line: f64,
    pub signal_line: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochRsiValue {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Most recent value of each indicator. A field is `None` when its own
/// minimum window was not met; one missing field never blocks the others.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub stoch_rsi: Option<StochRsiValue>,
    pub bollinger: Option<BollingerValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastMethod {
    LinearTrend,
    FeatureModel,
}

impl ForecastMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "linear_trend" => Some(Self::LinearTrend),
            "feature_model" => Some(Self::FeatureModel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinearTrend => "linear_trend",
            Self::FeatureModel => "feature_model",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forward price estimate. `predicted_close` is `None` when the selected
/// method could not produce an estimate; callers render that as "N/A".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastResult {
    pub predicted_close: Option<f64>,
    pub method: ForecastMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Aggregate 2-of-3 vote over RSI, Stochastic RSI and MACD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub action: Action,
    pub buy_score: u8,
    pub sell_score: u8,
}

/// Everything produced for one instrument in one report-generation call.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub text: String,
    pub snapshot: IndicatorSnapshot,
    pub forecast: Option<ForecastResult>,
    pub verdict: Verdict,
    pub generated_at: DateTime<Utc>,
}
