use std::fmt;

use crate::model::{Action, IndicatorSnapshot, MacdValue, StochRsiValue, Verdict};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const STOCH_OVERBOUGHT: f64 = 80.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
/// Votes required on one side for a BUY or SELL verdict.
const VOTES_REQUIRED: u8 = 2;

/// Categorical read of the latest RSI value. Threshold ties stay neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
    Unknown,
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "overbought, correction risk"),
            Self::Oversold => write!(f, "oversold, rebound possible"),
            Self::Neutral => write!(f, "neutral zone"),
            Self::Unknown => write!(f, "not enough data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Unknown,
}

impl fmt::Display for MacdTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish signal"),
            Self::Bearish => write!(f, "bearish signal"),
            Self::Unknown => write!(f, "not enough data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochZone {
    Overbought,
    Oversold,
    Neutral,
    Unknown,
}

impl fmt::Display for StochZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "overbought, pullback likely"),
            Self::Oversold => write!(f, "oversold, technical bounce possible"),
            Self::Neutral => write!(f, "neutral"),
            Self::Unknown => write!(f, "not enough data"),
        }
    }
}

pub fn rsi_zone(rsi: Option<f64>) -> RsiZone {
    match rsi {
        None => RsiZone::Unknown,
        Some(v) if v > RSI_OVERBOUGHT => RsiZone::Overbought,
        Some(v) if v < RSI_OVERSOLD => RsiZone::Oversold,
        Some(_) => RsiZone::Neutral,
    }
}

pub fn macd_trend(macd: Option<MacdValue>) -> MacdTrend {
    match macd {
        None => MacdTrend::Unknown,
        Some(m) if m.macd_line > m.signal_line => MacdTrend::Bullish,
        Some(_) => MacdTrend::Bearish,
    }
}

pub fn stoch_zone(stoch: Option<StochRsiValue>) -> StochZone {
    match stoch {
        None => StochZone::Unknown,
        Some(s) if s.k < STOCH_OVERSOLD && s.d < STOCH_OVERSOLD => StochZone::Oversold,
        Some(s) if s.k > STOCH_OVERBOUGHT && s.d > STOCH_OVERBOUGHT => StochZone::Overbought,
        Some(_) => StochZone::Neutral,
    }
}

/// 2-of-3 majority vote over RSI, Stochastic RSI and MACD.
///
/// An indicator whose snapshot field is `None` contributes to neither
/// score. One-shot classification, no state carried between calls.
pub fn classify(snapshot: &IndicatorSnapshot) -> Verdict {
    let rsi = rsi_zone(snapshot.rsi);
    let stoch = stoch_zone(snapshot.stoch_rsi);
    let macd = macd_trend(snapshot.macd);

    let mut buy_score = 0u8;
    if rsi == RsiZone::Oversold {
        buy_score += 1;
    }
    if stoch == StochZone::Oversold {
        buy_score += 1;
    }
    if macd == MacdTrend::Bullish {
        buy_score += 1;
    }

    let mut sell_score = 0u8;
    if rsi == RsiZone::Overbought {
        sell_score += 1;
    }
    if stoch == StochZone::Overbought {
        sell_score += 1;
    }
    if macd == MacdTrend::Bearish {
        sell_score += 1;
    }

    let action = if buy_score >= VOTES_REQUIRED && sell_score < VOTES_REQUIRED {
        Action::Buy
    } else if sell_score >= VOTES_REQUIRED && buy_score < VOTES_REQUIRED {
        Action::Sell
    } else {
        Action::Neutral
    };

    Verdict {
        action,
        buy_score,
        sell_score,
    }
}
