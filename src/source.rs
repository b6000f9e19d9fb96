pub mod chart;
pub mod gold;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::SourceError;
use crate::model::{RawHistory, SourceKind};

/// Abstraction over a candle-history provider.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketDataSource`).
pub trait MarketDataSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch up to `lookback_days` daily candles ending today, oldest first.
    ///
    /// The payload's own status marker is returned as-is; deciding whether
    /// it is usable belongs to the normalization step.
    fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> BoxFuture<'_, Result<RawHistory, Report<SourceError>>>;
}
