//! # Analysis pipeline
//! Pure, testable wiring of the core for one statement:
//! text → decisions, text → score + keywords, (new, previous) → shift,
//! everything → alert summary. No I/O; the caller supplies the previous
//! statement (date-sorted, immediately prior) and persists the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EmptyTextError;
use crate::extract::extract_decisions;
use crate::model::{Direction, Magnitude, ShiftResult, Statement};
use crate::scoring::score_text;
use crate::settings::Settings;
use crate::shift::detect_shift;
use crate::summary::{build_summary, AlertSummary};

/// One retrieved document, already stripped of markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementInput {
    pub date: NaiveDate,
    pub url: String,
    #[serde(alias = "text")]
    pub raw_text: String,
}

/// `[alerts]` in monitor.toml: which shifts deserve a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    pub min_magnitude: Magnitude,
    pub include_loosening: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            min_magnitude: Magnitude::Moderate,
            include_loosening: false,
        }
    }
}

impl AlertPolicy {
    pub fn admits(&self, shift: &ShiftResult) -> bool {
        shift.is_reportable()
            && shift.magnitude >= self.min_magnitude
            && (shift.direction == Direction::Tightening || self.include_loosening)
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub statement: Statement,
    pub shift: Option<ShiftResult>,
    pub summary: AlertSummary,
}

impl Analysis {
    pub fn alert_text(&self) -> String {
        self.summary.render()
    }

    /// False for the first statement ever and for shifts below the policy.
    pub fn should_alert(&self, policy: &AlertPolicy) -> bool {
        self.shift.as_ref().is_some_and(|s| policy.admits(s))
    }
}

/// Run the full core for one statement.
pub fn analyze_statement(
    input: StatementInput,
    previous: Option<&Statement>,
    settings: &Settings,
) -> Result<Analysis, EmptyTextError> {
    let cfg = &settings.config;
    let policy_decisions = extract_decisions(&input.raw_text, &cfg.anchors)?;
    let scored = score_text(&input.raw_text, &settings.lexicon, &cfg.scoring)?;

    let statement = Statement {
        date: input.date,
        url: input.url,
        raw_text: input.raw_text,
        tightening_score: scored.score,
        keywords: scored.keywords,
        policy_decisions,
    };

    let shift = detect_shift(&statement, previous, &cfg.shift);
    let summary = build_summary(&statement, shift.as_ref());

    Ok(Analysis {
        statement,
        shift,
        summary,
    })
}
