pub mod feature;
pub mod linear;

use crate::model::{ForecastMethod, ForecastResult, Series};

/// A forward price estimator.
///
/// Forecasting fails soft: any internal failure yields a result with
/// `predicted_close: None`, never an error. Callers render that as "N/A".
pub trait Forecaster: Send + Sync {
    fn method(&self) -> ForecastMethod;

    fn forecast(&self, series: &Series, horizon_days: usize) -> ForecastResult;
}

/// Select a forecaster implementation by configured method.
pub fn build_forecaster(method: ForecastMethod) -> Box<dyn Forecaster> {
    match method {
        ForecastMethod::LinearTrend => Box::new(linear::LinearTrend),
        ForecastMethod::FeatureModel => Box::new(feature::FeatureModel::default()),
    }
}
