//! Weighted tightening / easing vocabulary.
//!
//! JSON shape (`config/lexicon.json`, embedded as the built-in default):
//! {
//!   "tightening": [ { "term": "restrictive policy", "weight": 6 }, ... ],
//!   "easing":     [ { "term": "accommodative", "weight": 5 }, ... ]
//! }
//!
//! Terms are matched case- and whitespace-insensitively. Weights must be in
//! 1..=10 and the two lists must be disjoint; list order is kept and breaks
//! keyword-order ties in the scorer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::ConfigError;
use crate::text::normalize;

pub const MIN_WEIGHT: i32 = 1;
pub const MAX_WEIGHT: i32 = 10;

static BUILTIN: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../config/lexicon.json");
    Lexicon::from_json_str(raw).expect("valid built-in lexicon")
});

/// Which end of the stance spectrum a term signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Tightening,
    Easing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCfg {
    pub term: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    tightening: Vec<TermCfg>,
    #[serde(default)]
    easing: Vec<TermCfg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconTerm {
    /// Term as configured (trimmed); this is what shows up in keyword lists.
    pub term: String,
    /// Normalized form used for matching.
    pub key: String,
    pub weight: i32,
    pub polarity: Polarity,
}

impl LexiconTerm {
    /// Signed contribution to the raw score.
    pub fn signed_weight(&self) -> i32 {
        match self.polarity {
            Polarity::Tightening => self.weight,
            Polarity::Easing => -self.weight,
        }
    }
}

/// Validated, immutable term table. Tightening terms first, then easing,
/// each in configured order.
#[derive(Debug, Clone)]
pub struct Lexicon {
    terms: Vec<LexiconTerm>,
}

impl Lexicon {
    pub fn new(tightening: Vec<TermCfg>, easing: Vec<TermCfg>) -> Result<Self, ConfigError> {
        let mut terms: Vec<LexiconTerm> = Vec::with_capacity(tightening.len() + easing.len());

        let tagged = tightening
            .into_iter()
            .map(|t| (t, Polarity::Tightening))
            .chain(easing.into_iter().map(|t| (t, Polarity::Easing)));

        for (cfg, polarity) in tagged {
            let term = cfg.term.trim().to_string();
            let key = normalize(&term);
            if key.is_empty() {
                return Err(ConfigError::EmptyTerm);
            }
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&cfg.weight) {
                return Err(ConfigError::WeightOutOfRange {
                    term,
                    weight: cfg.weight,
                });
            }
            if let Some(existing) = terms.iter().find(|t| t.key == key) {
                return Err(if existing.polarity == polarity {
                    ConfigError::DuplicateTerm(term)
                } else {
                    ConfigError::OverlappingTerm(term)
                });
            }
            terms.push(LexiconTerm {
                term,
                key,
                weight: cfg.weight,
                polarity,
            });
        }

        Ok(Self { terms })
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let file: LexiconFile = serde_json::from_str(s)?;
        Self::new(file.tightening, file.easing)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Built-in default vocabulary (process-wide, parsed once).
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    pub fn terms(&self) -> &[LexiconTerm] {
        &self.terms
    }

    /// Lookup by configured or normalized spelling.
    pub fn get(&self, term: &str) -> Option<&LexiconTerm> {
        let key = normalize(term);
        self.terms.iter().find(|t| t.key == key)
    }

    pub fn by_polarity(&self, polarity: Polarity) -> impl Iterator<Item = &LexiconTerm> + '_ {
        self.terms.iter().filter(move |t| t.polarity == polarity)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(term: &str, weight: i32) -> TermCfg {
        TermCfg {
            term: term.into(),
            weight,
        }
    }

    #[test]
    fn builtin_parses_and_is_partitioned() {
        let lex = Lexicon::builtin();
        assert!(lex.by_polarity(Polarity::Tightening).count() > 10);
        assert!(lex.by_polarity(Polarity::Easing).count() > 5);
        assert_eq!(
            lex.get("Restrictive  Policy").map(|t| t.polarity),
            Some(Polarity::Tightening)
        );
        assert_eq!(lex.get("accommodative").map(|t| t.signed_weight()), Some(-5));
    }

    #[test]
    fn rejects_term_in_both_lists() {
        let err = Lexicon::new(vec![t("Firming", 3)], vec![t("firming ", 2)]).unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingTerm(ref s) if s == "firming"));
    }

    #[test]
    fn rejects_duplicates_and_bad_weights() {
        assert!(matches!(
            Lexicon::new(vec![t("a b", 3), t("A  B", 3)], vec![]),
            Err(ConfigError::DuplicateTerm(_))
        ));
        assert!(matches!(
            Lexicon::new(vec![t("hawkish", 11)], vec![]),
            Err(ConfigError::WeightOutOfRange { weight: 11, .. })
        ));
        assert!(matches!(
            Lexicon::new(vec![], vec![t("dovish", 0)]),
            Err(ConfigError::WeightOutOfRange { .. })
        ));
        assert!(matches!(
            Lexicon::new(vec![t("   ", 2)], vec![]),
            Err(ConfigError::EmptyTerm)
        ));
    }

    #[test]
    fn json_keeps_configured_order() {
        let lex = Lexicon::from_json_str(
            r#"{"tightening":[{"term":"b","weight":2},{"term":"a","weight":1}],"easing":[{"term":"c","weight":9}]}"#,
        )
        .unwrap();
        let order: Vec<&str> = lex.terms().iter().map(|t| t.term.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(lex.len(), 3);
    }
}
