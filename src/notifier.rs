pub mod telegram;
pub mod terminal;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::DeliveryError;
use crate::model::AnalysisReport;

/// Sink for finished analysis reports.
///
/// Delivery failure never invalidates the computed report; callers log it
/// and keep the report.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn deliver(&self, report: &AnalysisReport)
    -> BoxFuture<'_, Result<(), Report<DeliveryError>>>;
}
