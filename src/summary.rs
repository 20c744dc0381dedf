//! Alert text rendering. Pure formatting, fixed field order:
//! date → score → shift line → decisions → keywords → excerpts → URL.
//!
//! The shift line is left out both when there was no previous statement and
//! when the comparison found nothing to report (`Magnitude::None`).

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{self, Write as _};

use crate::model::{Decision, ShiftResult, Statement};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub statement_date: NaiveDate,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftResult>,
    pub decisions: Vec<Decision>,
    pub keywords: Vec<String>,
    pub url: String,
}

/// Collect everything the alert shows about `statement`.
pub fn build_summary(statement: &Statement, shift: Option<&ShiftResult>) -> AlertSummary {
    AlertSummary {
        statement_date: statement.date,
        score: statement.tightening_score,
        shift: shift.cloned(),
        decisions: statement.policy_decisions.clone(),
        keywords: statement.keywords.clone(),
        url: statement.url.clone(),
    }
}

impl AlertSummary {
    /// e.g. "Moderate tightening shift: +8.3 points (previous 57.5)".
    /// `None` when the line is omitted.
    pub fn shift_line(&self) -> Option<String> {
        let shift = self.shift.as_ref().filter(|s| s.is_reportable())?;
        Some(format!(
            "{} {} shift: {:+.1} points (previous {:.1})",
            shift.magnitude.label(),
            shift.direction.label(),
            shift.delta,
            shift.previous_score
        ))
    }

    pub fn excerpts(&self) -> &[String] {
        self.shift.as_ref().map(|s| s.excerpts.as_slice()).unwrap_or(&[])
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AlertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        writeln!(out, "Date: {}", self.statement_date.format("%B %d, %Y"))?;
        writeln!(out, "Tightening Score: {:.1}/100", self.score)?;
        if let Some(line) = self.shift_line() {
            writeln!(out, "Policy Shift: {line}")?;
        }

        if !self.decisions.is_empty() {
            out.push_str("\nKey Policy Decisions:\n");
            for d in &self.decisions {
                writeln!(out, "- {}: {}", d.category.label(), d.text)?;
            }
        }

        if !self.keywords.is_empty() {
            out.push_str("\nSignal Keywords:\n");
            for k in &self.keywords {
                writeln!(out, "- {k}")?;
            }
        }

        let excerpts = self.excerpts();
        if !excerpts.is_empty() {
            out.push_str("\nRelevant Excerpts:\n");
            for (i, e) in excerpts.iter().enumerate() {
                writeln!(out, "{}. {}", i + 1, e)?;
            }
        }

        write!(out, "\nFull statement: {}", self.url)?;
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecisionCategory, Direction, Magnitude};

    fn statement(score: f64) -> Statement {
        Statement {
            date: NaiveDate::from_ymd_opt(2023, 7, 26).unwrap(),
            url: "https://www.federalreserve.gov/newsevents/pressreleases/monetary20230726a.htm".into(),
            raw_text: "The Committee decided to raise the target range. Policy is restrictive.".into(),
            tightening_score: score,
            keywords: vec!["restrictive".into(), "raise the target range".into()],
            policy_decisions: vec![Decision::new(
                DecisionCategory::RateDecision,
                "The Committee decided to raise the target range.",
            )],
        }
    }

    fn shift(prev: f64, new: f64, magnitude: Magnitude) -> ShiftResult {
        ShiftResult {
            previous_score: prev,
            delta: new - prev,
            magnitude,
            direction: if new >= prev {
                Direction::Tightening
            } else {
                Direction::Loosening
            },
            excerpts: vec!["Policy is restrictive.".into()],
        }
    }

    #[test]
    fn renders_fields_in_fixed_order() {
        let st = statement(65.8);
        let sh = shift(57.5, 65.8, Magnitude::Moderate);
        let text = build_summary(&st, Some(&sh)).render();

        let order = [
            "Date: July 26, 2023",
            "Tightening Score: 65.8/100",
            "Policy Shift: Moderate tightening shift: +8.3 points (previous 57.5)",
            "- Rate Decision: The Committee decided to raise the target range.",
            "- restrictive",
            "- raise the target range",
            "1. Policy is restrictive.",
            "Full statement: https://www.federalreserve.gov/",
        ];
        let mut last = 0;
        for needle in order {
            let at = text[last..]
                .find(needle)
                .unwrap_or_else(|| panic!("missing or out of order: {needle}\n{text}"));
            last += at + needle.len();
        }
    }

    #[test]
    fn no_shift_line_when_magnitude_none() {
        let st = statement(51.0);
        let sh = shift(50.0, 51.0, Magnitude::None);
        let text = build_summary(&st, Some(&sh)).render();
        assert!(!text.contains("Policy Shift"));
        // Excerpts still shown; comparison happened.
        assert!(text.contains("1. Policy is restrictive."));
    }

    #[test]
    fn no_shift_line_for_first_statement() {
        let text = build_summary(&statement(42.0), None).render();
        assert!(!text.contains("Policy Shift"));
        assert!(!text.contains("Relevant Excerpts"));
        assert!(text.contains("42.0"));
        assert!(text.ends_with(&statement(42.0).url));
    }

    #[test]
    fn loosening_shift_has_negative_sign() {
        let st = statement(40.0);
        let sh = shift(62.0, 40.0, Magnitude::Significant);
        let line = build_summary(&st, Some(&sh)).shift_line().unwrap();
        assert_eq!(line, "Significant loosening shift: -22.0 points (previous 62.0)");
    }

    #[test]
    fn empty_sections_are_skipped() {
        let mut st = statement(50.0);
        st.keywords.clear();
        st.policy_decisions.clear();
        let text = build_summary(&st, None).render();
        assert!(!text.contains("Key Policy Decisions"));
        assert!(!text.contains("Signal Keywords"));
        assert!(text.contains("Tightening Score: 50.0/100"));
    }
}
