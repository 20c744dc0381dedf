//! Lexical tightening score.
//!
//! raw   = Σ weights of matched tightening terms − Σ weights of matched easing terms
//! score = clamp(50 + 50 · tanh(raw · scale / 50), 0, 100)
//!
//! Each distinct term counts once no matter how often it repeats (statements
//! recycle boilerplate). Different terms may overlap in the text and both count.
//! Near the centre one weight unit moves the score by roughly `scale` points;
//! far from it the curve saturates towards 0 / 100.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EmptyTextError};
use crate::lexicon::{Lexicon, LexiconTerm};
use crate::model::ScoreResult;
use crate::text::{find_term, normalize};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const DEFAULT_SCALE: f64 = 2.5;

/// `[scoring]` in monitor.toml.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringCfg {
    /// Score points per weight unit around the neutral point.
    pub scale: f64,
}

impl Default for ScoringCfg {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
        }
    }
}

impl ScoringCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale.is_finite() && self.scale > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Scale(self.scale))
        }
    }
}

/// Lexicon hit with its first-occurrence offset in the normalized text.
#[derive(Debug, Clone, Copy)]
pub struct TermHit<'l> {
    pub term: &'l LexiconTerm,
    pub position: usize,
}

/// All distinct lexicon terms present in `text`, ordered by first occurrence
/// (ties keep lexicon order).
pub fn find_hits<'l>(text: &str, lexicon: &'l Lexicon) -> Vec<TermHit<'l>> {
    let norm = normalize(text);
    let mut hits: Vec<TermHit<'l>> = lexicon
        .terms()
        .iter()
        .filter_map(|term| find_term(&norm, &term.key).map(|position| TermHit { term, position }))
        .collect();
    // Stable sort: equal positions stay in lexicon order.
    hits.sort_by_key(|h| h.position);
    hits
}

/// Map a raw weight balance onto [0, 100].
pub fn saturate(raw: i32, scale: f64) -> f64 {
    let x = f64::from(raw) * scale / NEUTRAL_SCORE;
    (NEUTRAL_SCORE + NEUTRAL_SCORE * x.tanh()).clamp(0.0, 100.0)
}

/// Score one statement.
pub fn score_text(raw_text: &str, lexicon: &Lexicon, cfg: &ScoringCfg) -> Result<ScoreResult, EmptyTextError> {
    if raw_text.trim().is_empty() {
        return Err(EmptyTextError);
    }

    let hits = find_hits(raw_text, lexicon);
    let raw: i32 = hits.iter().map(|h| h.term.signed_weight()).sum();

    Ok(ScoreResult {
        score: saturate(raw, cfg.scale),
        keywords: hits.iter().map(|h| h.term.term.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::TermCfg;

    fn lex() -> Lexicon {
        Lexicon::new(
            vec![
                TermCfg { term: "restrictive".into(), weight: 4 },
                TermCfg { term: "restrictive policy".into(), weight: 6 },
                TermCfg { term: "firming".into(), weight: 3 },
            ],
            vec![
                TermCfg { term: "accommodative".into(), weight: 5 },
                TermCfg { term: "downside risks".into(), weight: 2 },
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(score_text("", &lex(), &ScoringCfg::default()), Err(EmptyTextError));
        assert_eq!(score_text("  \n ", &lex(), &ScoringCfg::default()), Err(EmptyTextError));
    }

    #[test]
    fn no_terms_is_neutral() {
        let r = score_text("The weather was pleasant.", &lex(), &ScoringCfg::default()).unwrap();
        assert_eq!(r.score, 50.0);
        assert!(r.keywords.is_empty());
    }

    #[test]
    fn overlapping_terms_both_count_and_repeats_do_not() {
        let cfg = ScoringCfg { scale: 1.0 };
        let once = score_text("A restrictive policy stance.", &lex(), &cfg).unwrap();
        let twice = score_text(
            "A restrictive policy stance. Again, a restrictive policy stance.",
            &lex(),
            &cfg,
        )
        .unwrap();
        assert_eq!(once.keywords, vec!["restrictive", "restrictive policy"]);
        assert_eq!(once.score, twice.score);
        assert!((once.score - saturate(10, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn keywords_follow_first_occurrence() {
        let r = score_text(
            "Downside risks remain; policy is accommodative, yet further firming is possible. Firming!",
            &lex(),
            &ScoringCfg::default(),
        )
        .unwrap();
        assert_eq!(r.keywords, vec!["downside risks", "accommodative", "firming"]);
        // 3 − 5 − 2 = −4 → below neutral
        assert!(r.score < 50.0);
    }

    #[test]
    fn saturate_is_centered_monotonic_and_bounded() {
        assert_eq!(saturate(0, 2.5), 50.0);
        assert!(saturate(1, 2.5) > 50.0 && saturate(-1, 2.5) < 50.0);
        assert!((saturate(1, 2.5) - 50.0 - 2.5).abs() < 0.01);
        let mut last = -1.0;
        for raw in -500..=500 {
            let s = saturate(raw, 2.5);
            assert!((0.0..=100.0).contains(&s));
            assert!(s >= last);
            last = s;
        }
        assert!((saturate(-1_000, 10.0) - 0.0).abs() < 1e-9);
        assert!((saturate(1_000, 10.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_for_identical_text() {
        let text = "Restrictive policy, accommodative tone, firming bias.";
        let a = score_text(text, Lexicon::builtin(), &ScoringCfg::default()).unwrap();
        let b = score_text(text, Lexicon::builtin(), &ScoringCfg::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scale_must_be_positive() {
        assert!(ScoringCfg { scale: 0.0 }.validate().is_err());
        assert!(ScoringCfg { scale: f64::NAN }.validate().is_err());
        assert!(ScoringCfg::default().validate().is_ok());
    }
}
