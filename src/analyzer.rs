use chrono::Utc;
use error_stack::{Report, ResultExt};
use tracing::info;

use crate::engine::IndicatorEngine;
use crate::error::DataError;
use crate::forecast::build_forecaster;
use crate::model::{AnalysisReport, ForecastMethod};
use crate::report;
use crate::series::{self, MIN_HISTORY, PREFERRED_HISTORY};
use crate::signal;
use crate::source::MarketDataSource;

/// Per-report knobs, resolved from config before the call.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub lookback_days: usize,
    pub include_forecast: bool,
    pub forecast_horizon_days: usize,
    pub forecaster: ForecastMethod,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            lookback_days: 330,
            include_forecast: true,
            forecast_horizon_days: 252,
            forecaster: ForecastMethod::LinearTrend,
        }
    }
}

/// Run the full pipeline for one instrument: fetch, normalize, compute
/// indicators, optionally forecast, classify, render.
///
/// Everything is created and consumed within this call; nothing is cached
/// across invocations.
pub async fn generate_report(
    source: &dyn MarketDataSource,
    symbol: &str,
    options: &ReportOptions,
) -> Result<AnalysisReport, Report<DataError>> {
    let raw = source
        .fetch_history(symbol, options.lookback_days)
        .await
        .change_context(DataError::InvalidSource {
            reason: "history fetch failed".into(),
        })
        .attach_with(|| format!("symbol: {symbol}"))?;

    let min_required = if options.include_forecast {
        PREFERRED_HISTORY
    } else {
        MIN_HISTORY
    };
    let series = series::normalize(&raw, min_required)?;

    let snapshot = IndicatorEngine::standard().compute(&series);
    let forecast = options.include_forecast.then(|| {
        build_forecaster(options.forecaster).forecast(&series, options.forecast_horizon_days)
    });
    let verdict = signal::classify(&snapshot);

    let generated_at = Utc::now();
    let text = report::render(
        symbol,
        &series,
        &snapshot,
        forecast.as_ref(),
        &verdict,
        generated_at,
    );

    info!(
        symbol,
        source = %source.kind(),
        closes = series.len(),
        action = %verdict.action,
        buy_score = verdict.buy_score,
        sell_score = verdict.sell_score,
        "analysis complete"
    );

    Ok(AnalysisReport {
        symbol: symbol.to_owned(),
        text,
        snapshot,
        forecast,
        verdict,
        generated_at,
    })
}
