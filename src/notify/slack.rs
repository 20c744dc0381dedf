use anyhow::{Context, Result};
use reqwest::Client;

use super::{AlertEvent, Notifier};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    /// `None` unless `SLACK_WEBHOOK_URL` is set.
    pub fn from_env() -> Option<Self> {
        std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(Self::new)
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
        }
    }
}

fn message_text(ev: &AlertEvent) -> String {
    format!("*{}*\n```{}```", ev.title(), ev.text.trim_end())
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, ev: &AlertEvent) -> Result<()> {
        let body = serde_json::json!({ "text": message_text(ev) });

        self.client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
