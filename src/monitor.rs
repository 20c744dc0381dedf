//! One monitoring cycle: retrieve → skip known → analyse oldest first →
//! store → alert. The cycle is the only place that mutates history.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::history::{StatementHistory, Upsert};
use crate::ingest::{self, types::StatementSource};
use crate::model::{Direction, Magnitude};
use crate::notify::{AlertEvent, NotifierMux};
use crate::pipeline::{analyze_statement, StatementInput};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Re-analyse statements whose date is already stored.
    pub force: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewStatement {
    pub date: NaiveDate,
    pub url: String,
    pub tightening_score: f64,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TighteningAlert {
    pub statement_date: NaiveDate,
    pub magnitude: Magnitude,
    pub direction: Direction,
    pub delta: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugInfo {
    pub retrieved: usize,
    pub skipped_known: usize,
    pub failed: usize,
    pub history_len: usize,
    pub notifiers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub new_statements: Vec<NewStatement>,
    pub tightening_alerts: Vec<TighteningAlert>,
    pub status: CycleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

pub struct Monitor {
    sources: Vec<Box<dyn StatementSource>>,
    history: Mutex<StatementHistory>,
    settings: &'static Settings,
    notifier: Option<NotifierMux>,
}

impl Monitor {
    pub fn new(
        sources: Vec<Box<dyn StatementSource>>,
        history: StatementHistory,
        settings: &'static Settings,
    ) -> Self {
        Self {
            sources,
            history: Mutex::new(history),
            settings,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, mux: NotifierMux) -> Self {
        self.notifier = (!mux.is_empty()).then_some(mux);
        self
    }

    pub fn settings(&self) -> &'static Settings {
        self.settings
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Run one cycle. Cycles are serialized by the history lock; an error
    /// means the history could not be persisted, in which case nothing from
    /// this cycle is kept in memory and no alert is sent.
    pub async fn run_cycle(&self, opts: CycleOptions) -> Result<CycleReport> {
        let docs = ingest::run_once(&self.sources).await;
        let (report, events) = self.analyse_and_store(docs, opts).await?;

        // Delivery runs after the history lock is released.
        if let Some(mux) = &self.notifier {
            for ev in &events {
                mux.notify(ev).await;
            }
        }
        Ok(report)
    }

    async fn analyse_and_store(
        &self,
        docs: Vec<StatementInput>,
        opts: CycleOptions,
    ) -> Result<(CycleReport, Vec<AlertEvent>)> {
        let mut history = self.history.lock().await;
        let mut working = history.clone();

        let mut info = DebugInfo {
            retrieved: docs.len(),
            ..DebugInfo::default()
        };
        let mut new_statements = Vec::new();
        let mut events = Vec::new();
        let policy = &self.settings.config.alerts;

        // `docs` is date-ascending, so each statement's predecessor is already stored.
        for doc in docs {
            if !opts.force && working.contains(doc.date) {
                info.skipped_known += 1;
                continue;
            }
            let fp = fingerprint(&doc.raw_text);
            let previous = working.previous_before(doc.date);
            let analysis = match analyze_statement(doc, previous, self.settings) {
                Ok(a) => a,
                Err(e) => {
                    info.failed += 1;
                    tracing::warn!(target: "monitor", error = %e, fp = %fp, "statement skipped");
                    continue;
                }
            };

            let st = &analysis.statement;
            tracing::info!(
                target: "monitor",
                date = %st.date,
                score = st.tightening_score,
                keywords = st.keywords.len(),
                decisions = st.policy_decisions.len(),
                fp = %fp,
                "statement analysed"
            );

            if analysis.should_alert(policy) {
                if let Some(ev) = AlertEvent::from_analysis(&analysis) {
                    tracing::info!(
                        target: "monitor",
                        date = %ev.statement_date,
                        magnitude = ev.magnitude.label(),
                        direction = ev.direction.label(),
                        delta = ev.delta,
                        "stance shift alert"
                    );
                    events.push(ev);
                }
            }

            new_statements.push(NewStatement {
                date: st.date,
                url: st.url.clone(),
                tightening_score: st.tightening_score,
                keywords: st.keywords.clone(),
            });
            if working.upsert(analysis.statement) == Upsert::Replaced {
                tracing::debug!(target: "monitor", "replaced stored statement");
            }
        }

        if !new_statements.is_empty() {
            if let Err(e) = working.save().await {
                counter!("monitor_runs_total", "status" => "error").increment(1);
                tracing::warn!(target: "monitor", error = ?e, "history not saved, cycle discarded");
                return Err(e);
            }
        }
        *history = working;

        counter!("statements_processed_total").increment(new_statements.len() as u64);
        counter!("stance_alerts_total").increment(events.len() as u64);
        if let Some(last) = new_statements.last() {
            gauge!("last_tightening_score").set(last.tightening_score);
        }
        counter!("monitor_runs_total", "status" => "success").increment(1);
        gauge!("monitor_last_run_ts").set(Utc::now().timestamp() as f64);

        info.history_len = history.len();
        info.notifiers = self.notifier.as_ref().map_or(0, NotifierMux::len);
        tracing::info!(
            target: "monitor",
            new = new_statements.len(),
            alerts = events.len(),
            skipped = info.skipped_known,
            force = opts.force,
            "monitor cycle finished"
        );

        let tightening_alerts = events
            .iter()
            .map(|ev| TighteningAlert {
                statement_date: ev.statement_date,
                magnitude: ev.magnitude,
                direction: ev.direction,
                delta: ev.delta,
                summary: ev.text.clone(),
            })
            .collect();
        let report = CycleReport {
            new_statements,
            tightening_alerts,
            status: CycleStatus::Success,
            debug_info: opts.debug.then_some(info),
        };
        Ok((report, events))
    }
}

/// Short SHA-256 prefix; statement text itself never reaches the logs.
pub(crate) fn fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
