//! history.rs: scored statements persisted as one JSON array, sorted by date.
//!
//! The store answers a single question for the core: which statement comes
//! immediately before a given date. Missing file means "no history yet".

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::model::Statement;

pub const DEFAULT_HISTORY_PATH: &str = "state/historical_statements.json";
pub const ENV_HISTORY_PATH: &str = "HISTORY_PATH";

/// Outcome of `StatementHistory::upsert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone, Default)]
pub struct StatementHistory {
    /// `None` keeps the history in memory only.
    path: Option<PathBuf>,
    statements: Vec<Statement>,
}

impl StatementHistory {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// `$HISTORY_PATH` or `state/historical_statements.json`.
    pub fn default_path() -> PathBuf {
        std::env::var(ENV_HISTORY_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_HISTORY_PATH))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut statements: Vec<Statement> = match fs::read_to_string(&path).await {
            Ok(s) if s.trim().is_empty() => Vec::new(),
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing history at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(target: "history", path = %path.display(), "no history yet, starting fresh");
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading history at {}", path.display()))
            }
        };
        statements.sort_by_key(|s| s.date);
        tracing::info!(target: "history", count = statements.len(), "loaded historical statements");

        Ok(Self {
            path: Some(path),
            statements,
        })
    }

    pub fn from_statements(mut statements: Vec<Statement>) -> Self {
        statements.sort_by_key(|s| s.date);
        Self {
            path: None,
            statements,
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Statement> {
        self.statements.iter().find(|s| s.date == date)
    }

    /// Latest statement dated strictly before `date`.
    pub fn previous_before(&self, date: NaiveDate) -> Option<&Statement> {
        self.statements.iter().rev().find(|s| s.date < date)
    }

    /// Insert keeping date order, or replace the statement with the same date.
    pub fn upsert(&mut self, statement: Statement) -> Upsert {
        match self.statements.binary_search_by_key(&statement.date, |s| s.date) {
            Ok(idx) => {
                self.statements[idx] = statement;
                Upsert::Replaced
            }
            Err(idx) => {
                self.statements.insert(idx, statement);
                Upsert::Inserted
            }
        }
    }

    /// Write the whole history (tmp file + rename). No-op for in-memory stores.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(&self.statements).context("serializing history")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        tracing::info!(target: "history", count = self.statements.len(), "saved historical statements");
        Ok(())
    }
}
