pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod stoch_rsi;

use error_stack::Report;

use crate::error::IndicatorError;

/// A technical analysis indicator over a cleaned close-price series.
///
/// Values must be in ascending chronological order (oldest first).
pub trait Indicator: Send {
    /// Unique name of this indicator (e.g., "rsi", "macd").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Minimum number of input values required to produce at least one
    /// output value.
    fn required_values(&self) -> usize;

    /// Calculate indicator values from the input series.
    ///
    /// Returns one value per output point. The number of values may be less
    /// than the number of inputs depending on the indicator's lookback.
    fn calculate(&self, values: &[f64]) -> Result<Vec<f64>, Report<IndicatorError>>;
}
