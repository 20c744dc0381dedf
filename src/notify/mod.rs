//! Alert delivery. Every configured channel receives the same `AlertEvent`;
//! a failing channel is logged and never blocks the others.

pub mod discord;
pub mod email;
pub mod slack;

use anyhow::Result;
use chrono::NaiveDate;

use crate::model::{Direction, Magnitude};
use crate::pipeline::Analysis;

pub use discord::DiscordNotifier;
pub use email::EmailSender;
pub use slack::SlackNotifier;

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub statement_date: NaiveDate,
    pub magnitude: Magnitude,
    pub direction: Direction,
    pub delta: f64,
    pub score: f64,
    pub url: String,
    /// Rendered alert summary.
    pub text: String,
}

impl AlertEvent {
    /// `None` when the analysis has nothing to report (no previous statement
    /// or a `Magnitude::None` comparison).
    pub fn from_analysis(a: &Analysis) -> Option<Self> {
        let shift = a.shift.as_ref().filter(|s| s.is_reportable())?;
        Some(Self {
            statement_date: a.statement.date,
            magnitude: shift.magnitude,
            direction: shift.direction,
            delta: shift.delta,
            score: a.statement.tightening_score,
            url: a.statement.url.clone(),
            text: a.alert_text(),
        })
    }

    /// e.g. "Fed stance: Moderate tightening shift (+8.3)".
    pub fn title(&self) -> String {
        format!(
            "Fed stance: {} {} shift ({:+.1})",
            self.magnitude.label(),
            self.direction.label(),
            self.delta
        )
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, ev: &AlertEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[derive(Default)]
pub struct NotifierMux {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Channels whose environment variables are present. Incomplete SMTP
    /// settings disable email with a warning.
    pub fn from_env() -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

        if let Ok(url) = std::env::var("DISCORD_WEBHOOK_URL") {
            if !url.trim().is_empty() {
                notifiers.push(Box::new(DiscordNotifier::new(url)));
            }
        }
        if let Some(slack) = SlackNotifier::from_env() {
            notifiers.push(Box::new(slack));
        }
        match EmailSender::from_env() {
            Ok(Some(email)) => notifiers.push(Box::new(email)),
            Ok(None) => {}
            Err(e) => tracing::warn!(target: "notify", error = ?e, "email notifier disabled"),
        }

        let names: Vec<&str> = notifiers.iter().map(|n| n.name()).collect();
        tracing::info!(target: "notify", channels = ?names, "notifiers configured");
        Self { notifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Fan out to every channel; returns how many deliveries succeeded.
    pub async fn notify(&self, ev: &AlertEvent) -> usize {
        let mut delivered = 0;
        for n in &self.notifiers {
            match n.send(ev).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(target: "notify", channel = n.name(), error = ?e, "alert delivery failed")
                }
            }
        }
        delivered
    }
}
