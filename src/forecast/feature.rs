use crate::engine::{MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD};
use crate::forecast::Forecaster;
use crate::indicator::Indicator;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::model::{ForecastMethod, ForecastResult, Series};

const LOOKBACK: usize = 14;
const MIN_TRAINING_ROWS: usize = 10;
/// Ridge term keeping degenerate feature columns (e.g. all-zero volume)
/// solvable.
const RIDGE: f64 = 1e-6;
/// Neutral stand-ins for feature positions where the indicator window is
/// not yet defined.
const NEUTRAL_RSI: f64 = 50.0;
const NEUTRAL_MACD: f64 = 0.0;

/// Feature-based regressor: a least-squares linear model over lagged close,
/// lagged normalized volume, and lagged RSI/MACD values, trained per call.
///
/// The prediction comes from the latest feature vector; `horizon_days` does
/// not change the feature construction.
#[derive(Default)]
pub struct FeatureModel;

impl Forecaster for FeatureModel {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::FeatureModel
    }

    fn forecast(&self, series: &Series, _horizon_days: usize) -> ForecastResult {
        ForecastResult {
            predicted_close: predict(series),
            method: self.method(),
        }
    }
}

fn predict(series: &Series) -> Option<f64> {
    let closes = &series.closes;
    let n = closes.len();
    if n <= LOOKBACK {
        return None;
    }

    let rsi = aligned_indicator(&Rsi::new(RSI_PERIOD).ok()?, closes);
    let macd = Macd::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).ok()?;
    let (macd_line, signal_line) = aligned_macd(&macd, closes);

    let feature_row = |i: usize| -> Vec<f64> {
        vec![
            closes[i],
            series.volumes.get(i).copied().unwrap_or(0.0) / 1_000_000.0,
            rsi[i].unwrap_or(NEUTRAL_RSI),
            macd_line[i].unwrap_or(NEUTRAL_MACD),
            signal_line[i].unwrap_or(NEUTRAL_MACD),
        ]
    };

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in LOOKBACK..n {
        rows.push(feature_row(i - 1));
        labels.push(closes[i]);
    }

    if rows.len() < MIN_TRAINING_ROWS {
        return None;
    }

    let coefficients = fit_least_squares(&rows, &labels)?;

    let latest = feature_row(n - 1);
    let mut predicted = coefficients[0];
    for (c, x) in coefficients[1..].iter().zip(latest.iter()) {
        predicted += c * x;
    }
    predicted.is_finite().then_some(predicted)
}

/// Spread indicator output over the full series length, `None` before the
/// indicator's first defined position.
fn aligned_indicator(indicator: &dyn Indicator, closes: &[f64]) -> Vec<Option<f64>> {
    let values = indicator.calculate(closes).unwrap_or_default();
    align(closes.len(), values)
}

fn aligned_macd(macd: &Macd, closes: &[f64]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let pairs = macd.calculate_lines(closes).unwrap_or_default();
    let (lines, signals): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    (align(closes.len(), lines), align(closes.len(), signals))
}

fn align(total_len: usize, values: Vec<f64>) -> Vec<Option<f64>> {
    let offset = total_len.saturating_sub(values.len());
    let mut output = vec![None; total_len];
    for (index, value) in values.into_iter().enumerate() {
        output[offset + index] = Some(value);
    }
    output
}

/// Ordinary least squares with intercept via normal equations.
///
/// Returns `[intercept, coefficients...]`, or `None` when the system is
/// singular despite the ridge term.
fn fit_least_squares(rows: &[Vec<f64>], labels: &[f64]) -> Option<Vec<f64>> {
    let dims = rows.first()?.len() + 1;

    // A = XᵀX + ridge·I, b = Xᵀy, with X carrying a leading 1s column
    let mut a = vec![vec![0.0; dims]; dims];
    let mut b = vec![0.0; dims];
    for (row, &y) in rows.iter().zip(labels.iter()) {
        let mut x = Vec::with_capacity(dims);
        x.push(1.0);
        x.extend_from_slice(row);
        for i in 0..dims {
            for j in 0..dims {
                a[i][j] += x[i] * x[j];
            }
            b[i] += x[i] * y;
        }
    }
    for (i, row) in a.iter_mut().enumerate() {
        row[i] += RIDGE;
    }

    solve(a, b)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
