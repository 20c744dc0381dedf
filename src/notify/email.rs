use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{AlertEvent, Notifier};

const SMTP_VARS: [&str; 5] = ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "NOTIFY_EMAIL_FROM", "NOTIFY_EMAIL_TO"];

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// `Ok(None)` when no SMTP variable is set; an error when only some are
    /// set or a value does not parse.
    pub fn from_env() -> Result<Option<Self>> {
        let vals: Vec<Option<String>> = SMTP_VARS
            .iter()
            .map(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
            .collect();
        if vals.iter().all(Option::is_none) {
            return Ok(None);
        }
        let missing: Vec<&str> = SMTP_VARS
            .iter()
            .zip(&vals)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("incomplete SMTP settings, missing {}", missing.join(", "));
        }
        let [host, user, pass, from_addr, to_addr]: [String; 5] = vals
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| anyhow::anyhow!("SMTP settings"))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(Credentials::new(user, pass))
            .build();
        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Some(Self { mailer, from, to }))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailSender {
    async fn send(&self, ev: &AlertEvent) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(ev.title())
            .header(header::ContentType::TEXT_PLAIN)
            .body(ev.text.clone())
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
