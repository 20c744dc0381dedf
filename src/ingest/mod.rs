// src/ingest/mod.rs
//! Statement retrieval: providers discover statement pages, this module turns
//! HTML into the plain text + date the analysis core expects.

pub mod providers;
pub mod types;

use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;

use crate::ingest::types::StatementSource;
use crate::pipeline::StatementInput;

/// Documents shorter than this are page chrome, not statements.
pub const MIN_STATEMENT_CHARS: usize = 100;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>").expect("script regex"));
static RE_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("paragraph regex"));
static RE_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body>").expect("body regex"));
static RE_ARTICLE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)class="[^"]*article__time[^"]*"[^>]*>(.*?)</"#).expect("article time regex"));
static RE_LONG_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][a-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})").expect("long date regex"));

/// Markers of the main content column on federalreserve.gov pages.
const ARTICLE_MARKERS: &[&str] = &[r#"id="article""#, r#"class="col-xs-12 col-sm-8 col-md-8""#];

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_statements_total", "Statement documents retrieved from providers.");
        describe_counter!(
            "ingest_filtered_total",
            "Documents dropped as too short or duplicate."
        );
        describe_counter!("ingest_provider_errors_total", "Provider fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Statement page parse time in milliseconds.");
    });
}

/// Normalize text: strip tags, then decode entities (so `&lt;` stays text),
/// ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let out = RE_TAGS.replace_all(s, " ");
    let out = html_escape::decode_html_entities(&out);
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");
    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// Policy text of a statement page: paragraphs of the main column that are
/// long or talk about policy; falls back to the whole body text.
pub fn extract_policy_text(html: &str) -> String {
    let html = RE_SCRIPT.replace_all(html, " ");
    let start = ARTICLE_MARKERS
        .iter()
        .filter_map(|m| html.find(m))
        .min()
        .unwrap_or(0);
    let scope = &html[start..];

    let paragraphs: Vec<String> = RE_PARAGRAPH
        .captures_iter(scope)
        .filter_map(|c| c.get(1))
        .map(|m| normalize_text(m.as_str()))
        .filter(|p| {
            let lower = p.to_ascii_lowercase();
            p.chars().count() > 100
                || lower.contains("federal funds rate")
                || lower.contains("monetary policy")
        })
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs.join(" ");
    }

    let body = RE_BODY
        .captures(&html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(&*html);
    normalize_text(body)
}

/// "January 31, 2024" (also "Jan. 31 2024") → date.
pub fn parse_long_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let candidate = format!("{month} {day} {year}");
    NaiveDate::parse_from_str(&candidate, "%B %d %Y")
        .or_else(|_| NaiveDate::parse_from_str(&candidate, "%b %d %Y"))
        .ok()
}

/// Statement date: the `article__time` block first, then the first
/// "Month D, YYYY" anywhere in the page text.
pub fn extract_date(html: &str) -> Option<NaiveDate> {
    let from_caps = |c: regex::Captures| parse_long_date(&c[1], &c[2], &c[3]);

    if let Some(block) = RE_ARTICLE_TIME.captures(html).and_then(|c| c.get(1)) {
        let text = normalize_text(block.as_str());
        if let Some(d) = RE_LONG_DATE.captures(&text).and_then(from_caps) {
            return Some(d);
        }
    }

    let text = normalize_text(&RE_SCRIPT.replace_all(html, " "));
    RE_LONG_DATE.captures_iter(&text).find_map(from_caps)
}

/// Keep documents long enough to be statements, drop repeated URLs / dates,
/// and sort ascending by date so each statement's predecessor is fixed.
pub fn filter_and_order(docs: Vec<StatementInput>) -> (Vec<StatementInput>, usize) {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_dates: HashSet<NaiveDate> = HashSet::new();
    let mut dropped = 0usize;
    let mut kept = Vec::with_capacity(docs.len());

    for doc in docs {
        let long_enough = doc.raw_text.trim().chars().count() >= MIN_STATEMENT_CHARS;
        if !long_enough {
            tracing::warn!(target: "ingest", url = %doc.url, "could not extract meaningful text");
            dropped += 1;
            continue;
        }
        if !seen_urls.insert(doc.url.clone()) || !seen_dates.insert(doc.date) {
            dropped += 1;
            continue;
        }
        kept.push(doc);
    }

    kept.sort_by_key(|d| d.date);
    (kept, dropped)
}

/// Run every provider once. Provider failures are logged and counted, never fatal.
pub async fn run_once(sources: &[Box<dyn StatementSource>]) -> Vec<StatementInput> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for s in sources {
        match s.fetch_statements().await {
            Ok(mut v) => {
                counter!("ingest_statements_total").increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = s.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    let (kept, dropped) = filter_and_order(raw);
    counter!("ingest_filtered_total").increment(dropped as u64);
    tracing::info!(target: "ingest", kept = kept.len(), dropped, "statement retrieval finished");
    kept
}
