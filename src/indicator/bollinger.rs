use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;

/// Bollinger Bands: SMA middle band ± a multiple of the rolling
/// population standard deviation.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        if std_dev_multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "std_dev_multiplier must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            std_dev_multiplier,
        })
    }

    /// Returns (lower, middle, upper) band values.
    pub fn calculate_bands(
        &self,
        values: &[f64],
    ) -> Result<Vec<(f64, f64, f64)>, Report<IndicatorError>> {
        if values.len() < self.period {
            bail!(IndicatorError::InsufficientData {
                required: self.period,
                available: values.len(),
            });
        }

        let sma = Sma::new(self.period)?.calculate(values)?;

        let bands = values
            .windows(self.period)
            .zip(sma.iter())
            .map(|(window, &middle)| {
                let variance =
                    window.iter().map(|&p| (p - middle).powi(2)).sum::<f64>() / self.period as f64;
                let std_dev = variance.sqrt();
                let upper = middle + self.std_dev_multiplier * std_dev;
                let lower = middle - self.std_dev_multiplier * std_dev;
                (lower, middle, upper)
            })
            .collect();

        Ok(bands)
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn required_values(&self) -> usize {
        self.period
    }

    /// Returns middle band (SMA) values only.
    fn calculate(&self, values: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self
            .calculate_bands(values)?
            .into_iter()
            .map(|(_, m, _)| m)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_period_zero_invalid() {
        assert!(BollingerBands::new(0, 2.0).is_err());
    }

    #[test]
    fn bollinger_negative_multiplier_invalid() {
        assert!(BollingerBands::new(20, -1.0).is_err());
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = BollingerBands::new(5, 2.0).unwrap();
        assert!(bb.calculate(&[1.0; 4]).is_err());
    }

    #[test]
    fn bollinger_flat_values_zero_width() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let bands = bb.calculate_bands(&[10.0_f64; 5]).unwrap();
        for (lower, middle, upper) in &bands {
            assert!((lower - 10.0).abs() < 1e-9);
            assert!((middle - 10.0).abs() < 1e-9);
            assert!((upper - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bollinger_bands_rise_with_the_series() {
        let bb = BollingerBands::new(20, 2.0).unwrap();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let bands = bb.calculate_bands(&closes).unwrap();
        for pair in bands.windows(2) {
            let (prev_lower, prev_middle, prev_upper) = pair[0];
            let (lower, middle, upper) = pair[1];
            assert!(lower > prev_lower);
            assert!(middle > prev_middle);
            assert!(upper > prev_upper);
        }
    }

    #[test]
    fn bollinger_band_ordering() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let bands = bb.calculate_bands(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        for (lower, middle, upper) in &bands {
            assert!(lower <= middle && middle <= upper);
            // upper - middle == middle - lower (symmetric around SMA)
            assert!((upper - middle - (middle - lower)).abs() < 1e-9);
        }
    }
}
