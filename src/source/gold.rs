use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;

use crate::error::SourceError;
use crate::model::{Candle, RawHistory, SourceKind};
use crate::source::MarketDataSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const GOLD_REQUESTS_PER_SECOND: u32 = 2;
const QUOTE_CURRENCY: &str = "USD";

/// Spot-metal history endpoint returning one JSON row per day, authorized
/// via an `x-access-token` header.
pub struct GoldApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl GoldApiSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let quota = Quota::per_second(nonzero!(GOLD_REQUESTS_PER_SECOND));
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoldHistoryRow {
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl GoldHistoryRow {
    fn into_candle(self) -> Candle {
        Candle {
            timestamp: DateTime::from_timestamp(self.timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume.unwrap_or(0.0),
        }
    }
}

impl MarketDataSource for GoldApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gold
    }

    fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> BoxFuture<'_, Result<RawHistory, Report<SourceError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let url = format!("{}/{symbol}/{QUOTE_CURRENCY}/history", self.base_url);

            let response = self
                .client
                .get(&url)
                .timeout(REQUEST_TIMEOUT)
                .header("x-access-token", &self.api_key)
                .query(&[
                    ("period", "1d"),
                    ("format", "json"),
                    ("length", &lookback_days.to_string()),
                ])
                .send()
                .await
                .change_context(SourceError::Request {
                    provider: "gold".into(),
                })?;

            if !response.status().is_success() {
                return Err(Report::new(SourceError::Request {
                    provider: "gold".into(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let rows: Vec<GoldHistoryRow> =
                response
                    .json()
                    .await
                    .change_context(SourceError::ResponseParse {
                        provider: "gold".into(),
                    })?;

            let mut candles: Vec<Candle> = rows.into_iter().map(GoldHistoryRow::into_candle).collect();
            // Provider returns newest-first; analysis wants oldest-first
            candles.sort_by_key(|c| c.timestamp);

            Ok(RawHistory::from_candles("ok", &candles))
        })
    }
}
