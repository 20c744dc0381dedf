//! Stance-shift detection against the immediately preceding statement.
//!
//! Magnitude bands use closed lower bounds on |delta|:
//!   [0, slight) → None, [slight, moderate) → Slight,
//!   [moderate, significant) → Moderate, [significant, ∞) → Significant.
//! Direction is Tightening for delta ≥ 0.
//!
//! Excerpts are ranked by how many distinct statement keywords a sentence
//! carries (ties: earlier sentence first), then padded with the opening
//! sentences when fewer than `max_excerpts` sentences carry any keyword.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Direction, Magnitude, ShiftResult, Statement};
use crate::text::{find_term, normalize, split_sentences};

/// Upper bound on excerpts per shift, whatever `max_excerpts` says.
pub const MAX_EXCERPTS: usize = 3;

/// `[shift]` in monitor.toml.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftThresholds {
    pub slight: f64,
    pub moderate: f64,
    pub significant: f64,
    pub max_excerpts: usize,
}

impl Default for ShiftThresholds {
    fn default() -> Self {
        Self {
            slight: 3.0,
            moderate: 5.0,
            significant: 15.0,
            max_excerpts: MAX_EXCERPTS,
        }
    }
}

impl ShiftThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [self.slight, self.moderate, self.significant];
        if all.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ConfigError::Thresholds(
                "thresholds must be finite and non-negative".into(),
            ));
        }
        if !(self.slight <= self.moderate && self.moderate <= self.significant) {
            return Err(ConfigError::Thresholds(format!(
                "expected slight <= moderate <= significant, got {} / {} / {}",
                self.slight, self.moderate, self.significant
            )));
        }
        if self.max_excerpts > MAX_EXCERPTS {
            return Err(ConfigError::Thresholds(format!(
                "max_excerpts must be at most {MAX_EXCERPTS}, got {}",
                self.max_excerpts
            )));
        }
        Ok(())
    }

    pub fn classify(&self, delta: f64) -> Magnitude {
        let d = delta.abs();
        if d >= self.significant {
            Magnitude::Significant
        } else if d >= self.moderate {
            Magnitude::Moderate
        } else if d >= self.slight {
            Magnitude::Slight
        } else {
            Magnitude::None
        }
    }
}

pub fn direction_of(delta: f64) -> Direction {
    if delta >= 0.0 {
        Direction::Tightening
    } else {
        Direction::Loosening
    }
}

/// Compare `current` with `previous`. `None` when there is nothing to compare
/// against (first statement ever), which is distinct from `Magnitude::None`.
pub fn detect_shift(
    current: &Statement,
    previous: Option<&Statement>,
    cfg: &ShiftThresholds,
) -> Option<ShiftResult> {
    let previous = previous?;
    let delta = current.tightening_score - previous.tightening_score;

    Some(ShiftResult {
        previous_score: previous.tightening_score,
        delta,
        magnitude: cfg.classify(delta),
        direction: direction_of(delta),
        excerpts: select_excerpts(&current.raw_text, &current.keywords, cfg.max_excerpts),
    })
}

/// Pick up to `max` verbatim sentences of `text` that best illustrate `keywords`.
pub fn select_excerpts(text: &str, keywords: &[String], max: usize) -> Vec<String> {
    let max = max.min(MAX_EXCERPTS);
    let sentences = split_sentences(text);
    let keys: Vec<String> = keywords.iter().map(|k| normalize(k)).collect();

    let mut ranked: Vec<(usize, usize)> = sentences
        .iter()
        .filter_map(|s| {
            let norm = normalize(s.text);
            let hits = keys.iter().filter(|k| find_term(&norm, k).is_some()).count();
            (hits > 0).then_some((s.index, hits))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut picked: Vec<usize> = ranked.into_iter().take(max).map(|(idx, _)| idx).collect();
    for s in &sentences {
        if picked.len() >= max {
            break;
        }
        if !picked.contains(&s.index) {
            picked.push(s.index);
        }
    }

    picked
        .into_iter()
        .map(|idx| sentences[idx].text.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn st(score: f64, text: &str, keywords: &[&str]) -> Statement {
        Statement {
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            url: "https://example.test".into(),
            raw_text: text.into(),
            tightening_score: score,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            policy_decisions: vec![],
        }
    }

    #[test]
    fn absent_previous_means_no_result() {
        let cur = st(70.0, "Policy is restrictive.", &["restrictive"]);
        assert!(detect_shift(&cur, None, &ShiftThresholds::default()).is_none());
    }

    #[test]
    fn delta_is_exact_and_moderate_tightening() {
        let prev = st(57.5, "x.", &[]);
        let cur = st(65.8, "Policy is restrictive.", &["restrictive"]);
        let r = detect_shift(&cur, Some(&prev), &ShiftThresholds::default()).unwrap();
        assert_eq!(r.delta, 65.8 - 57.5);
        assert!((r.delta - 8.3).abs() < 1e-9);
        assert_eq!(r.previous_score, 57.5);
        assert_eq!(r.direction, Direction::Tightening);
        assert_eq!(r.magnitude, Magnitude::Moderate);
    }

    #[test]
    fn band_boundaries_are_closed_below() {
        let t = ShiftThresholds::default();
        assert_eq!(t.classify(2.999), Magnitude::None);
        assert_eq!(t.classify(3.0), Magnitude::Slight);
        assert_eq!(t.classify(-3.0), Magnitude::Slight);
        assert_eq!(t.classify(4.999), Magnitude::Slight);
        assert_eq!(t.classify(5.0), Magnitude::Moderate);
        assert_eq!(t.classify(14.999), Magnitude::Moderate);
        assert_eq!(t.classify(15.0), Magnitude::Significant);
        assert_eq!(t.classify(-40.0), Magnitude::Significant);
    }

    #[test]
    fn configurable_bands() {
        let t = ShiftThresholds {
            slight: 3.0,
            moderate: 10.0,
            significant: 20.0,
            max_excerpts: 3,
        };
        assert!(t.validate().is_ok());
        assert_eq!(t.classify(9.99), Magnitude::Slight);
        assert_eq!(t.classify(10.0), Magnitude::Moderate);
        assert_eq!(t.classify(20.0), Magnitude::Significant);
    }

    #[test]
    fn invalid_bands_are_rejected() {
        let t = ShiftThresholds {
            slight: 5.0,
            moderate: 3.0,
            ..Default::default()
        };
        assert!(t.validate().is_err());
        let neg = ShiftThresholds {
            slight: -1.0,
            ..Default::default()
        };
        assert!(neg.validate().is_err());
    }

    #[test]
    fn excerpt_limit_is_capped_at_three() {
        let wide = ShiftThresholds {
            max_excerpts: 6,
            ..Default::default()
        };
        assert!(wide.validate().is_err());

        let text = "Policy is restrictive. Policy is restrictive again. Still restrictive. \
                    Restrictive once more. Restrictive to the end.";
        let current = st(70.0, text, &["restrictive"]);
        let shift = detect_shift(&current, Some(&st(50.0, "x", &[])), &wide).unwrap();
        assert_eq!(shift.excerpts.len(), MAX_EXCERPTS);
    }

    #[test]
    fn small_drop_is_loosening_none() {
        let prev = st(50.0, "x.", &[]);
        let cur = st(49.0, "Nothing.", &[]);
        let r = detect_shift(&cur, Some(&prev), &ShiftThresholds::default()).unwrap();
        assert_eq!(r.direction, Direction::Loosening);
        assert_eq!(r.magnitude, Magnitude::None);
        assert!(!r.is_reportable());
    }

    #[test]
    fn zero_delta_counts_as_tightening() {
        assert_eq!(direction_of(0.0), Direction::Tightening);
    }

    #[test]
    fn excerpts_rank_by_distinct_keywords_then_order() {
        let text = "Opening remarks. Policy is restrictive. \
                    Policy is restrictive and firming continues. \
                    Firming again. Closing.";
        let kws = vec!["restrictive".to_string(), "firming".to_string()];
        let ex = select_excerpts(text, &kws, 3);
        assert_eq!(
            ex,
            vec![
                "Policy is restrictive and firming continues.",
                "Policy is restrictive.",
                "Firming again."
            ]
        );
    }

    #[test]
    fn excerpts_pad_with_opening_sentences() {
        let text = "First sentence. Second sentence. Policy is restrictive. Last.";
        let ex = select_excerpts(text, &["restrictive".to_string()], 3);
        assert_eq!(
            ex,
            vec!["Policy is restrictive.", "First sentence.", "Second sentence."]
        );
        for e in &ex {
            assert!(text.contains(e.as_str()));
        }
    }

    #[test]
    fn excerpts_never_exceed_available_sentences() {
        let ex = select_excerpts("Only one.", &[], 3);
        assert_eq!(ex, vec!["Only one."]);
        assert!(select_excerpts("a. b. c.", &[], 0).is_empty());
    }
}
