use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::DeliveryError;
use crate::model::AnalysisReport;
use crate::notifier::Notifier;

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn name(&self) -> &str {
        "terminal"
    }

    fn deliver(
        &self,
        report: &AnalysisReport,
    ) -> BoxFuture<'_, Result<(), Report<DeliveryError>>> {
        tracing::info!(
            symbol = %report.symbol,
            action = %report.verdict.action,
            buy_score = report.verdict.buy_score,
            sell_score = report.verdict.sell_score,
            "REPORT:\n{}",
            report.text,
        );
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, IndicatorSnapshot, Verdict};
    use chrono::Utc;

    #[tokio::test]
    async fn terminal_notifier_does_not_fail() {
        let report = AnalysisReport {
            symbol: "FPT".into(),
            text: "Technical analysis FPT".into(),
            snapshot: IndicatorSnapshot::default(),
            forecast: None,
            verdict: Verdict {
                action: Action::Neutral,
                buy_score: 0,
                sell_score: 0,
            },
            generated_at: Utc::now(),
        };
        assert!(TerminalNotifier.deliver(&report).await.is_ok());
    }
}
