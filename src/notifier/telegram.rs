use std::time::Duration;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde_json::json;

use crate::error::DeliveryError;
use crate::model::AnalysisReport;
use crate::notifier::Notifier;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivers reports through the Telegram Bot API `sendMessage` call.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn deliver(
        &self,
        report: &AnalysisReport,
    ) -> BoxFuture<'_, Result<(), Report<DeliveryError>>> {
        let text = report.text.clone();
        Box::pin(async move {
            let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", self.bot_token);
            let body = json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            });

            let response = self
                .client
                .post(&url)
                .timeout(REQUEST_TIMEOUT)
                .json(&body)
                .send()
                .await
                .change_context(DeliveryError::Request {
                    channel: "telegram".into(),
                })?;

            if !response.status().is_success() {
                return Err(Report::new(DeliveryError::Rejected {
                    channel: "telegram".into(),
                    status: response.status().to_string(),
                }));
            }

            Ok(())
        })
    }
}
