//! One-off analysis of a statement saved as plain text; prints the alert summary.
//!
//! usage: analyze_file <statement.txt> <YYYY-MM-DD> [url] [--previous <statement.json>] [--notify]

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use fed_stance_monitor::{
    analyze_statement, notify::AlertEvent, settings, NotifierMux, Settings, Statement, StatementInput,
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let mut positional = Vec::new();
    let mut previous_path = None;
    let mut notify = false;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--previous" => previous_path = Some(args.next().context("--previous needs a path")?),
            "--notify" => notify = true,
            _ => positional.push(a),
        }
    }
    let [path, date, rest @ ..] = positional.as_slice() else {
        bail!("usage: analyze_file <statement.txt> <YYYY-MM-DD> [url] [--previous <statement.json>] [--notify]");
    };

    let settings = settings::init(Settings::from_env()?);
    let raw_text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").context("date must be YYYY-MM-DD")?;
    let url = rest.first().cloned().unwrap_or_else(|| format!("file://{path}"));

    let previous: Option<Statement> = match previous_path {
        Some(p) => {
            let body = std::fs::read_to_string(&p).with_context(|| format!("reading {p}"))?;
            Some(serde_json::from_str(&body).with_context(|| format!("parsing {p}"))?)
        }
        None => None,
    };

    let analysis = analyze_statement(StatementInput { date, url, raw_text }, previous.as_ref(), settings)?;
    println!("{}", analysis.alert_text());

    if notify && analysis.should_alert(&settings.config.alerts) {
        if let Some(ev) = AlertEvent::from_analysis(&analysis) {
            let delivered = NotifierMux::from_env().notify(&ev).await;
            println!("alert delivered to {delivered} channel(s)");
        }
    }
    Ok(())
}
