use crate::indicator::bollinger::BollingerBands;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::indicator::stoch_rsi::StochRsi;
use crate::model::{BollingerValue, IndicatorSnapshot, MacdValue, Series, StochRsiValue};

/// Standard indicator parameter set used by the reports.
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const STOCH_PERIOD: usize = 14;
pub const STOCH_SMOOTH: usize = 3;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Computes the fixed indicator set over a cleaned series.
///
/// Each indicator is evaluated independently: one falling short of its own
/// minimum window leaves that snapshot field `None` without blocking the
/// others. `compute` is a pure function of the series.
pub struct IndicatorEngine {
    rsi: Rsi,
    macd: Macd,
    stoch_rsi: StochRsi,
    bollinger: BollingerBands,
}

impl IndicatorEngine {
    /// Engine with the standard RSI(14) / MACD(12,26,9) /
    /// StochRSI(14,14,3,3) / Bollinger(20,2) parameters.
    pub fn standard() -> Self {
        // Fixed parameters are valid by construction
        Self {
            rsi: Rsi::new(RSI_PERIOD).unwrap(),
            macd: Macd::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).unwrap(),
            stoch_rsi: StochRsi::new(STOCH_PERIOD, STOCH_PERIOD, STOCH_SMOOTH, STOCH_SMOOTH)
                .unwrap(),
            bollinger: BollingerBands::new(BOLLINGER_PERIOD, BOLLINGER_STD_DEV).unwrap(),
        }
    }

    pub fn compute(&self, series: &Series) -> IndicatorSnapshot {
        use crate::indicator::Indicator;

        let closes = &series.closes;

        let rsi = self
            .rsi
            .calculate(closes)
            .ok()
            .and_then(|values| values.last().copied());

        let macd = self
            .macd
            .calculate_lines(closes)
            .ok()
            .and_then(|pairs| pairs.last().copied())
            .map(|(macd_line, signal_line)| MacdValue {
                macd_line,
                signal_line,
            });

        let stoch_rsi = self
            .stoch_rsi
            .calculate_kd(closes)
            .ok()
            .and_then(|pairs| pairs.last().copied())
            .map(|(k, d)| StochRsiValue { k, d });

        let bollinger = self
            .bollinger
            .calculate_bands(closes)
            .ok()
            .and_then(|bands| bands.last().copied())
            .map(|(lower, middle, upper)| BollingerValue {
                lower,
                middle,
                upper,
            });

        IndicatorSnapshot {
            rsi,
            macd,
            stoch_rsi,
            bollinger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: Vec<f64>) -> Series {
        Series {
            closes,
            volumes: vec![],
        }
    }

    fn oscillating_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + ((i * 7) % 13) as f64 - 6.0)
            .collect()
    }

    #[test]
    fn short_series_yields_all_none() {
        let engine = IndicatorEngine::standard();
        let snapshot = engine.compute(&series(vec![10.0; 10]));
        assert!(snapshot.rsi.is_none());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.stoch_rsi.is_none());
        assert!(snapshot.bollinger.is_none());
    }

    #[test]
    fn indicators_are_independent() {
        // 20 closes: enough for RSI and Bollinger, short of MACD (35) and
        // Stochastic RSI (34)
        let engine = IndicatorEngine::standard();
        let snapshot = engine.compute(&series(oscillating_closes(20)));
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.bollinger.is_some());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.stoch_rsi.is_none());
    }

    #[test]
    fn full_series_fills_all_fields() {
        let engine = IndicatorEngine::standard();
        let snapshot = engine.compute(&series(oscillating_closes(60)));
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.macd.is_some());
        assert!(snapshot.stoch_rsi.is_some());
        assert!(snapshot.bollinger.is_some());

        let bb = snapshot.bollinger.unwrap();
        assert!(bb.lower <= bb.middle && bb.middle <= bb.upper);
        let rsi = snapshot.rsi.unwrap();
        assert!((0.0..=100.0).contains(&rsi));
        let stoch = snapshot.stoch_rsi.unwrap();
        assert!((0.0..=100.0).contains(&stoch.k));
        assert!((0.0..=100.0).contains(&stoch.d));
    }

    #[test]
    fn compute_is_idempotent() {
        let engine = IndicatorEngine::standard();
        let s = series(oscillating_closes(60));
        assert_eq!(engine.compute(&s), engine.compute(&s));
    }

    #[test]
    fn rising_series_is_bullish() {
        let engine = IndicatorEngine::standard();
        // Accelerating rise: a perfectly linear one degenerates into
        // macd_line == signal_line and the bullish read becomes a coin flip
        let closes: Vec<f64> = (0..330).map(|i| 100.0 + (i * i) as f64 * 0.01).collect();
        let snapshot = engine.compute(&series(closes));

        let rsi = snapshot.rsi.unwrap();
        assert!(rsi > 70.0, "monotone rise should push RSI high, got {rsi}");

        let macd = snapshot.macd.unwrap();
        assert!(macd.macd_line > macd.signal_line);

        let bb = snapshot.bollinger.unwrap();
        assert!(bb.lower <= bb.middle && bb.middle <= bb.upper);
    }
}
