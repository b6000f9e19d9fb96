use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;

use crate::error::SourceError;
use crate::model::{RawHistory, SourceKind};
use crate::source::MarketDataSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Requested time window behind "now"; countback limits what comes back.
const WINDOW_DAYS: i64 = 365;
const CHART_REQUESTS_PER_SECOND: u32 = 4;

/// TradingView-style chart history endpoint (`s/t/o/h/l/c/v` arrays).
pub struct ChartApiSource {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ChartApiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let quota = Quota::per_second(nonzero!(CHART_REQUESTS_PER_SECOND));
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

/// Bar arrays as served by the chart API. Everything except the status
/// marker may be missing on error responses.
#[derive(Debug, Deserialize)]
struct ChartHistoryResponse {
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    v: Vec<f64>,
}

impl From<ChartHistoryResponse> for RawHistory {
    fn from(response: ChartHistoryResponse) -> Self {
        Self {
            status: response.s,
            timestamps: response.t,
            opens: response.o,
            highs: response.h,
            lows: response.l,
            closes: response.c,
            volumes: response.v,
        }
    }
}

impl MarketDataSource for ChartApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Chart
    }

    fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> BoxFuture<'_, Result<RawHistory, Report<SourceError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let to = Utc::now();
            let from = to - ChronoDuration::days(WINDOW_DAYS);
            let url = format!("{}/chart/v2/history", self.base_url);

            let response = self
                .client
                .get(&url)
                .timeout(REQUEST_TIMEOUT)
                .query(&[
                    ("symbol", symbol.as_str()),
                    ("resolution", "1D"),
                    ("from", &from.timestamp().to_string()),
                    ("to", &to.timestamp().to_string()),
                    ("countback", &lookback_days.to_string()),
                ])
                .send()
                .await
                .change_context(SourceError::Request {
                    provider: "chart".into(),
                })?;

            if !response.status().is_success() {
                return Err(Report::new(SourceError::Request {
                    provider: "chart".into(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let payload: ChartHistoryResponse =
                response
                    .json()
                    .await
                    .change_context(SourceError::ResponseParse {
                        provider: "chart".into(),
                    })?;

            Ok(payload.into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_maps_to_raw_history() {
        let json = r#"{
            "s": "ok",
            "t": [1700000000, 1700086400],
            "o": [99.0, 101.0],
            "h": [102.0, 103.0],
            "l": [98.0, 100.0],
            "c": [101.0, 102.5],
            "v": [1200000.0, 900000.0]
        }"#;
        let response: ChartHistoryResponse = serde_json::from_str(json).unwrap();
        let raw: RawHistory = response.into();
        assert!(raw.is_ok());
        assert_eq!(raw.closes, vec![101.0, 102.5]);
        assert_eq!(raw.volumes.len(), 2);
        assert_eq!(raw.timestamps, vec![1_700_000_000, 1_700_086_400]);
    }

    #[test]
    fn error_response_without_arrays_parses() {
        let response: ChartHistoryResponse = serde_json::from_str(r#"{"s": "no_data"}"#).unwrap();
        let raw: RawHistory = response.into();
        assert!(!raw.is_ok());
        assert!(raw.closes.is_empty());
    }

    #[test]
    fn source_kind_is_chart() {
        assert_eq!(
            ChartApiSource::new("https://example.com").kind(),
            SourceKind::Chart
        );
    }
}
