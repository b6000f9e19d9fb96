use crate::forecast::Forecaster;
use crate::model::{ForecastMethod, ForecastResult, Series};

/// Ordinary least-squares linear trend over the full close history.
///
/// Closes are regressed against a 0-based integer time index; the estimate
/// is the fitted line evaluated `horizon_days` past the last index.
pub struct LinearTrend;

impl Forecaster for LinearTrend {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::LinearTrend
    }

    fn forecast(&self, series: &Series, horizon_days: usize) -> ForecastResult {
        ForecastResult {
            predicted_close: predict(&series.closes, horizon_days),
            method: self.method(),
        }
    }
}

fn predict(closes: &[f64], horizon_days: usize) -> Option<f64> {
    let n = closes.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = closes.iter().sum();
    let sum_xy: f64 = closes.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;

    let predicted = slope * (nf - 1.0 + horizon_days as f64) + intercept;
    predicted.is_finite().then_some(predicted)
}
