use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{AlertEvent, Notifier};
use crate::model::Direction;

/// Discord caps embed descriptions at 4096 characters.
const MAX_DESCRIPTION_CHARS: usize = 4000;
const COLOR_TIGHTENING: u32 = 0xC0392B;
const COLOR_LOOSENING: u32 = 0x2E86C1;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    async fn post_with_retries(&self, payload: &DiscordWebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status_ref() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!("Discord webhook HTTP error: {e}"),
                },
                Err(e) => anyhow!("Discord webhook request failed: {e}"),
            };
            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::debug!(target: "notify", attempt, error = %err, "retrying discord webhook");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, ev: &AlertEvent) -> Result<()> {
        let payload = DiscordWebhookPayload::from_event(ev);
        self.post_with_retries(&payload).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
    color: u32,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_event(ev: &AlertEvent) -> Self {
        let color = match ev.direction {
            Direction::Tightening => COLOR_TIGHTENING,
            Direction::Loosening => COLOR_LOOSENING,
        };
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: ev.title(),
                description: truncate_chars(&ev.text, MAX_DESCRIPTION_CHARS),
                url: ev.url.clone(),
                color,
            }],
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
