use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;
use crate::indicator::rsi::Rsi;

/// Stochastic RSI: RSI normalized into a 0-100 oscillator via rolling
/// min/max, then smoothed into %K and %D lines.
pub struct StochRsi {
    rsi_period: usize,
    stoch_period: usize,
    k_period: usize,
    d_period: usize,
}

impl StochRsi {
    pub fn new(
        rsi_period: usize,
        stoch_period: usize,
        k_period: usize,
        d_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if rsi_period == 0 || stoch_period == 0 || k_period == 0 || d_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        Ok(Self {
            rsi_period,
            stoch_period,
            k_period,
            d_period,
        })
    }

    /// Calculate (%K, %D) pairs, aligned to the most recent values.
    pub fn calculate_kd(&self, values: &[f64]) -> Result<Vec<(f64, f64)>, Report<IndicatorError>> {
        if values.len() < self.required_values() {
            bail!(IndicatorError::InsufficientData {
                required: self.required_values(),
                available: values.len(),
            });
        }

        let rsi = Rsi::new(self.rsi_period)?.calculate(values)?;

        // Raw %K: stochastic normalization of RSI over a rolling window.
        // A flat window (max == min) has no range; its raw %K is 0.
        let raw_k: Vec<f64> = rsi
            .windows(self.stoch_period)
            .map(|w| {
                let min = w.iter().copied().fold(f64::INFINITY, f64::min);
                let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if max > min {
                    (w[w.len() - 1] - min) / (max - min) * 100.0
                } else {
                    0.0
                }
            })
            .collect();

        let k = Sma::new(self.k_period)?.calculate(&raw_k)?;
        let d = Sma::new(self.d_period)?.calculate(&k)?;

        // Each %D value pairs with the last %K of its smoothing window
        let k_offset = self.d_period - 1;
        Ok(k[k_offset..]
            .iter()
            .zip(d.iter())
            .map(|(k, d)| (*k, *d))
            .collect())
    }
}

impl Indicator for StochRsi {
    fn name(&self) -> &str {
        "stoch_rsi"
    }

    fn required_values(&self) -> usize {
        self.rsi_period + self.stoch_period + self.k_period + self.d_period
    }

    /// Returns %K values only.
    fn calculate(&self, values: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self
            .calculate_kd(values)?
            .into_iter()
            .map(|(k, _)| k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oscillating_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + ((i * 7) % 13) as f64 - 6.0)
            .collect()
    }

    #[test]
    fn stoch_rsi_period_zero_invalid() {
        assert!(StochRsi::new(0, 14, 3, 3).is_err());
        assert!(StochRsi::new(14, 14, 3, 0).is_err());
    }

    #[test]
    fn stoch_rsi_insufficient_data() {
        let stoch = StochRsi::new(14, 14, 3, 3).unwrap();
        assert!(stoch.calculate_kd(&[1.0; 30]).is_err());
    }

    #[test]
    fn stoch_rsi_values_bounded() {
        let stoch = StochRsi::new(14, 14, 3, 3).unwrap();
        let pairs = stoch.calculate_kd(&oscillating_closes(120)).unwrap();
        assert!(!pairs.is_empty());
        for (k, d) in &pairs {
            assert!((0.0..=100.0).contains(k), "%K out of range: {k}");
            assert!((0.0..=100.0).contains(d), "%D out of range: {d}");
        }
    }

    #[test]
    fn stoch_rsi_flat_window_is_zero() {
        // Flat closes give a constant RSI, so every stochastic window is
        // degenerate and raw %K collapses to 0
        let stoch = StochRsi::new(3, 3, 2, 2).unwrap();
        let pairs = stoch.calculate_kd(&[10.0_f64; 20]).unwrap();
        for (k, d) in &pairs {
            assert!(k.abs() < 1e-9);
            assert!(d.abs() < 1e-9);
        }
    }

    #[test]
    fn stoch_rsi_saturated_rsi_handled() {
        // A strict monotone rise saturates RSI at 100, leaving every
        // stochastic window degenerate; the result is defined, not NaN
        let stoch = StochRsi::new(14, 14, 3, 3).unwrap();
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let pairs = stoch.calculate_kd(&closes).unwrap();
        let (k, d) = *pairs.last().unwrap();
        assert!(k.is_finite() && (0.0..=100.0).contains(&k));
        assert!(d.is_finite() && (0.0..=100.0).contains(&d));
    }

    #[test]
    fn stoch_rsi_output_alignment() {
        let stoch = StochRsi::new(14, 14, 3, 3).unwrap();
        let closes = oscillating_closes(60);
        let pairs = stoch.calculate_kd(&closes).unwrap();
        let k_only = stoch.calculate(&closes).unwrap();
        assert_eq!(pairs.len(), k_only.len());
        for ((k, _), k2) in pairs.iter().zip(k_only.iter()) {
            assert!((k - k2).abs() < 1e-12);
        }
    }
}
