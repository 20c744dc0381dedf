//! model.rs: shapes handed between the analysis core and its collaborators.
//!
//! `Statement` is what the history store persists; `ShiftResult` and the
//! summary are derived per run and never stored on their own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy decision categories, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    RateDecision,
    BalanceSheet,
    ForwardGuidance,
}

impl DecisionCategory {
    pub const ALL: [DecisionCategory; 3] = [
        DecisionCategory::RateDecision,
        DecisionCategory::BalanceSheet,
        DecisionCategory::ForwardGuidance,
    ];

    /// Human label used in alert text.
    pub fn label(self) -> &'static str {
        match self {
            DecisionCategory::RateDecision => "Rate Decision",
            DecisionCategory::BalanceSheet => "Balance Sheet",
            DecisionCategory::ForwardGuidance => "Forward Guidance",
        }
    }
}

impl fmt::Display for DecisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One extracted decision: the verbatim sentence that anchored the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub category: DecisionCategory,
    pub text: String,
}

impl Decision {
    pub fn new(category: DecisionCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// Scorer output, folded into `Statement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Always within [0, 100]; 50 is neutral.
    pub score: f64,
    /// Distinct matched terms, first-occurrence order.
    pub keywords: Vec<String>,
}

/// A scored statement. Immutable once produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub date: NaiveDate,
    pub url: String,
    pub raw_text: String,
    pub tightening_score: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub policy_decisions: Vec<Decision>,
}

impl Statement {
    pub fn decision(&self, category: DecisionCategory) -> Option<&Decision> {
        self.policy_decisions.iter().find(|d| d.category == category)
    }
}

/// How big a stance move is. `None` means "compared, but nothing to report".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Magnitude {
    None,
    Slight,
    Moderate,
    Significant,
}

impl Magnitude {
    pub fn label(self) -> &'static str {
        match self {
            Magnitude::None => "No",
            Magnitude::Slight => "Slight",
            Magnitude::Moderate => "Moderate",
            Magnitude::Significant => "Significant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Tightening,
    Loosening,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Tightening => "tightening",
            Direction::Loosening => "loosening",
        }
    }
}

/// Comparison against the immediately preceding statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftResult {
    pub previous_score: f64,
    /// new − previous, unrounded.
    pub delta: f64,
    pub magnitude: Magnitude,
    pub direction: Direction,
    /// At most three verbatim sentences of the new statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excerpts: Vec<String>,
}

impl ShiftResult {
    /// True unless the magnitude is `None`.
    pub fn is_reportable(&self) -> bool {
        self.magnitude != Magnitude::None
    }
}
