use chrono::{DateTime, Utc};

use crate::model::{ForecastResult, IndicatorSnapshot, Series, Verdict};
use crate::signal::{self, MacdTrend, StochZone};

const VOLUME_AVG_WINDOW: usize = 20;
const MILLION: f64 = 1_000_000.0;

/// Price/volume display stats derived from the series tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub last_close: f64,
    #[allow(dead_code)]
    pub prev_close: f64,
    pub change_percent: f64,
    pub last_volume: f64,
    pub avg_volume: f64,
}

pub fn summary_stats(series: &Series) -> SummaryStats {
    let closes = &series.closes;
    let volumes = &series.volumes;

    let last_close = *closes.last().unwrap_or(&0.0);
    let prev_close = if closes.len() > 1 {
        closes[closes.len() - 2]
    } else {
        last_close
    };
    // Zero previous close reads as no change, never a division by zero
    let change_percent = if prev_close != 0.0 {
        (last_close - prev_close) / prev_close * 100.0
    } else {
        0.0
    };

    let last_volume = *volumes.last().unwrap_or(&0.0);
    let window = volumes.len().min(VOLUME_AVG_WINDOW);
    let avg_volume = if window > 0 {
        volumes[volumes.len() - window..].iter().sum::<f64>() / window as f64
    } else {
        0.0
    };

    SummaryStats {
        last_close,
        prev_close,
        change_percent,
        last_volume,
        avg_volume,
    }
}

/// Assemble the full report text for one instrument.
///
/// Field derivations are the contract; the phrasing is display-only.
pub fn render(
    symbol: &str,
    series: &Series,
    snapshot: &IndicatorSnapshot,
    forecast: Option<&ForecastResult>,
    verdict: &Verdict,
    generated_at: DateTime<Utc>,
) -> String {
    let stats = summary_stats(series);

    let mut out = String::new();

    out.push_str(&format!("Technical analysis {symbol}\n\n"));
    out.push_str(&format!(
        "- Close: {:.2} ({}{:.2}%)\n",
        stats.last_close,
        if stats.change_percent >= 0.0 { "+" } else { "" },
        stats.change_percent,
    ));
    out.push_str(&format!(
        "- Volume: {:.2}M (avg{}: {:.2}M)\n\n",
        stats.last_volume / MILLION,
        VOLUME_AVG_WINDOW,
        stats.avg_volume / MILLION,
    ));

    out.push_str("Indicators:\n");
    match snapshot.rsi {
        Some(rsi) => out.push_str(&format!(
            "- RSI(14): {:.1} ({})\n",
            rsi,
            signal::rsi_zone(Some(rsi)),
        )),
        None => out.push_str("- RSI(14): N/A (not enough data)\n"),
    }
    match snapshot.macd {
        Some(macd) => out.push_str(&format!(
            "- MACD: {:.2} vs signal {:.2} ({})\n",
            macd.macd_line,
            macd.signal_line,
            signal::macd_trend(Some(macd)),
        )),
        None => out.push_str("- MACD: N/A (not enough data)\n"),
    }
    match snapshot.stoch_rsi {
        Some(stoch) => out.push_str(&format!(
            "- Stochastic RSI: K={:.2}, D={:.2} ({})\n",
            stoch.k,
            stoch.d,
            signal::stoch_zone(Some(stoch)),
        )),
        None => out.push_str("- Stochastic RSI: N/A (not enough data)\n"),
    }

    out.push_str(&format!(
        "\nTrend:\n{symbol} is {}. {}\n",
        trend_sentence(snapshot),
        short_outlook(snapshot),
    ));

    out.push_str("\nPrice levels:\n");
    match snapshot.bollinger {
        Some(bb) => {
            out.push_str(&format!(
                "- Suggested entry: {:.2} (lower Bollinger band, potential support)\n",
                bb.lower,
            ));
            out.push_str(&format!(
                "- Suggested exit: {:.2} (upper Bollinger band, potential resistance)\n",
                bb.upper,
            ));
        }
        None => out.push_str("- Not enough data for support/resistance levels\n"),
    }

    if let Some(forecast) = forecast {
        match forecast.predicted_close {
            Some(predicted) => out.push_str(&format!(
                "- Forecast ({}): {:.2}\n",
                forecast.method, predicted,
            )),
            None => out.push_str(&format!(
                "- Forecast ({}): N/A (insufficient data)\n",
                forecast.method,
            )),
        }
    }

    out.push_str(&format!(
        "\nVerdict: {} (buy {}/3, sell {}/3)\n",
        verdict.action, verdict.buy_score, verdict.sell_score,
    ));

    out.push_str("\nNote: technical analysis only, not investment advice.\n");
    out.push_str(&format!("\n{}\n", generated_at.format("%Y-%m-%d %H:%M UTC")));

    out
}

fn trend_sentence(snapshot: &IndicatorSnapshot) -> &'static str {
    match signal::macd_trend(snapshot.macd) {
        MacdTrend::Bullish => "showing signs of recovery",
        MacdTrend::Bearish => "under selling pressure",
        MacdTrend::Unknown => "missing enough data to judge the trend",
    }
}

fn short_outlook(snapshot: &IndicatorSnapshot) -> &'static str {
    let oversold_rsi = snapshot.rsi.is_some_and(|rsi| rsi < 35.0);
    let oversold_stoch = signal::stoch_zone(snapshot.stoch_rsi) == StochZone::Oversold;

    if oversold_rsi || oversold_stoch {
        "A short-term technical rebound is possible."
    } else if signal::macd_trend(snapshot.macd) == MacdTrend::Bearish {
        "Risk of retesting support levels."
    } else {
        "Continue observing."
    }
}
