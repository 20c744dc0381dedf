use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::ingest::types::StatementSource;
use crate::ingest::{extract_date, extract_policy_text};
use crate::pipeline::StatementInput;

pub const DEFAULT_FEED_URL: &str = "https://www.federalreserve.gov/feeds/press_monetary.xml";
pub const ENV_FEED_URL: &str = "FED_RSS_URL";
const FED_BASE_URL: &str = "https://www.federalreserve.gov";
const DEFAULT_MAX_ITEMS: usize = 5;
const HTTP_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; fed-stance-monitor/0.1)";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Monetary-policy press releases feed → FOMC statement pages.
pub struct FedRssProvider {
    mode: Mode,
    max_items: usize,
}

enum Mode {
    /// Feed XML plus page HTML keyed by absolute URL.
    Fixture {
        feed: String,
        pages: HashMap<String, String>,
    },
    Http {
        feed_url: String,
        client: reqwest::Client,
    },
}

impl FedRssProvider {
    pub fn from_fixture(feed: impl Into<String>, pages: HashMap<String, String>) -> Self {
        Self {
            mode: Mode::Fixture {
                feed: feed.into(),
                pages,
            },
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn from_url(feed_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("building fed http client")?;
        Ok(Self {
            mode: Mode::Http {
                feed_url: feed_url.into(),
                client,
            },
            max_items: DEFAULT_MAX_ITEMS,
        })
    }

    /// `$FED_RSS_URL` or the public monetary press-release feed.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_FEED_URL).unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
        Self::from_url(url)
    }

    /// Follow at most `n` statement links per run (newest first, as the feed lists them).
    pub fn with_max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    async fn get(&self, url: &str) -> Result<String> {
        match &self.mode {
            Mode::Fixture { feed, pages } => {
                if url.is_empty() {
                    return Ok(feed.clone());
                }
                pages
                    .get(url)
                    .cloned()
                    .with_context(|| format!("fixture has no page for {url}"))
            }
            Mode::Http { client, .. } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()
                    .with_context(|| format!("GET {url} non-2xx"))?;
                resp.text().await.with_context(|| format!("reading body of {url}"))
            }
        }
    }

    async fn get_feed(&self) -> Result<String> {
        match &self.mode {
            Mode::Fixture { .. } => self.get("").await,
            Mode::Http { feed_url, .. } => self.get(feed_url).await,
        }
    }

    async fn fetch_one(&self, url: &str, pub_date: Option<NaiveDate>) -> Result<Option<StatementInput>> {
        let html = self.get(url).await?;

        let t0 = std::time::Instant::now();
        let raw_text = extract_policy_text(&html);
        let date = extract_date(&html).or(pub_date);
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let Some(date) = date else {
            tracing::warn!(target: "ingest", url, "could not extract statement date");
            return Ok(None);
        };
        Ok(Some(StatementInput {
            date,
            url: url.to_string(),
            raw_text,
        }))
    }
}

/// Items whose title announces an FOMC policy statement.
pub fn is_statement_title(title: &str) -> bool {
    let t = title.to_ascii_lowercase();
    t.contains("statement")
        && (t.contains("fomc") || t.contains("federal open market committee"))
        && !t.contains("minutes")
        && !t.contains("longer-run goals")
}

fn absolute_url(link: &str) -> String {
    let link = link.trim();
    if link.starts_with('/') {
        format!("{FED_BASE_URL}{link}")
    } else {
        link.to_string()
    }
}

fn parse_rfc2822_date(ts: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(ts.trim()).ok().map(|dt| dt.date_naive())
}

/// (absolute link, feed date) for every statement item, in feed order.
fn statement_links(feed_xml: &str) -> Result<Vec<(String, Option<NaiveDate>)>> {
    let xml_clean = scrub_html_entities_for_xml(feed_xml);
    let rss: Rss = from_str(&xml_clean).context("parsing fed rss xml")?;

    let mut seen = Vec::new();
    for it in rss.channel.item {
        let (Some(title), Some(link)) = (it.title.as_deref(), it.link.as_deref()) else {
            continue;
        };
        if !is_statement_title(title) {
            continue;
        }
        let url = absolute_url(link);
        if seen.iter().any(|(u, _)| u == &url) {
            continue;
        }
        tracing::debug!(target: "ingest", %url, "found statement link");
        seen.push((url, it.pub_date.as_deref().and_then(parse_rfc2822_date)));
    }
    Ok(seen)
}

#[async_trait]
impl StatementSource for FedRssProvider {
    async fn fetch_statements(&self) -> Result<Vec<StatementInput>> {
        let feed = self.get_feed().await.context("fetching fed rss feed")?;
        let links = statement_links(&feed)?;

        let mut out = Vec::new();
        for (url, pub_date) in links.into_iter().take(self.max_items) {
            match self.fetch_one(&url, pub_date).await {
                Ok(Some(doc)) => {
                    tracing::info!(
                        target: "ingest",
                        url = %doc.url,
                        date = %doc.date,
                        chars = doc.raw_text.len(),
                        "extracted statement"
                    );
                    out.push(doc);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(target: "ingest", error = ?e, %url, "statement page error");
                    counter!("ingest_provider_errors_total").increment(1);
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Fed"
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
