//! Decision extraction: pick the sentence that carries each policy decision.
//!
//! For every category we keep an ordered list of anchor phrases. Sentences are
//! scanned in order and the first one containing any anchor of a category
//! becomes that category's decision. Categories are matched independently, so
//! one sentence may serve several of them. Nothing is ever synthesized: a
//! category without an anchored sentence is simply left out.

use serde::{Deserialize, Serialize};

use crate::error::EmptyTextError;
use crate::model::{Decision, DecisionCategory};
use crate::text::{contains_phrase, normalize, split_sentences};

/// Anchor phrases per category (`[anchors]` in monitor.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSet {
    pub rate_decision: Vec<String>,
    pub balance_sheet: Vec<String>,
    pub forward_guidance: Vec<String>,
}

impl Default for AnchorSet {
    fn default() -> Self {
        fn owned(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            rate_decision: owned(&[
                "target range for the federal funds rate",
                "federal funds rate",
                "policy rate",
                "interest rate paid on reserve balances",
            ]),
            balance_sheet: owned(&[
                "holdings of treasury securities",
                "agency mortgage-backed securities",
                "balance sheet",
                "securities holdings",
                "asset purchases",
                "reduce its holdings",
                "reinvest",
                "redemptions",
            ]),
            forward_guidance: owned(&[
                "in determining the extent",
                "in considering any adjustments",
                "in assessing the appropriate stance",
                "additional policy firming",
                "further policy firming",
                "future adjustments",
                "will be prepared to adjust",
                "the committee anticipates",
                "the committee expects",
                "remains highly attentive",
                "strongly committed",
            ]),
        }
    }
}

impl AnchorSet {
    pub fn for_category(&self, category: DecisionCategory) -> &[String] {
        match category {
            DecisionCategory::RateDecision => &self.rate_decision,
            DecisionCategory::BalanceSheet => &self.balance_sheet,
            DecisionCategory::ForwardGuidance => &self.forward_guidance,
        }
    }
}

/// Extract at most one decision per category, in category order.
pub fn extract_decisions(raw_text: &str, anchors: &AnchorSet) -> Result<Vec<Decision>, EmptyTextError> {
    if raw_text.trim().is_empty() {
        return Err(EmptyTextError);
    }

    // Normalize each sentence once; categories reuse it.
    let sentences: Vec<(&str, String)> = split_sentences(raw_text)
        .into_iter()
        .map(|s| (s.text, normalize(s.text)))
        .collect();

    let decisions = DecisionCategory::ALL
        .iter()
        .filter_map(|&category| {
            let phrases = anchors.for_category(category);
            sentences
                .iter()
                .find(|(_, norm)| phrases.iter().any(|p| contains_phrase(norm, p)))
                .map(|(text, _)| Decision::new(category, *text))
        })
        .collect();

    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOMC: &str = "Recent indicators suggest that economic activity has been expanding at a solid pace. \
        In support of its goals, the Committee decided to maintain the target range for the federal funds rate at 5-1/4 to 5-1/2 percent. \
        In determining the extent of any additional policy firming that may be appropriate, the Committee will take into account the cumulative tightening of monetary policy. \
        In addition, the Committee will continue reducing its holdings of Treasury securities and agency debt.";

    #[test]
    fn finds_all_three_categories_verbatim() {
        let out = extract_decisions(FOMC, &AnchorSet::default()).unwrap();
        let cats: Vec<_> = out.iter().map(|d| d.category).collect();
        assert_eq!(
            cats,
            vec![
                DecisionCategory::RateDecision,
                DecisionCategory::BalanceSheet,
                DecisionCategory::ForwardGuidance
            ]
        );
        for d in &out {
            assert!(FOMC.contains(&d.text), "not verbatim: {}", d.text);
            assert_eq!(d.text, d.text.trim());
        }
        assert!(out[0].text.starts_with("In support of its goals"));
        assert!(out[1].text.contains("holdings of Treasury securities"));
        assert!(out[2].text.starts_with("In determining the extent"));
    }

    #[test]
    fn first_matching_sentence_wins() {
        let text = "The federal funds rate was discussed. The Committee raised the federal funds rate.";
        let out = extract_decisions(text, &AnchorSet::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "The federal funds rate was discussed.");
    }

    #[test]
    fn one_sentence_can_serve_several_categories() {
        let text = "The Committee expects to hold the federal funds rate steady.";
        let out = extract_decisions(text, &AnchorSet::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, out[1].text);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let text = "Reinvestment aside, the BALANCE\n  SHEET will shrink.";
        let out = extract_decisions(text, &AnchorSet::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, DecisionCategory::BalanceSheet);
        assert_eq!(out[0].text, text);
    }

    #[test]
    fn no_anchor_means_no_decision() {
        let out = extract_decisions("Nothing about monetary policy here.", &AnchorSet::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn empty_text_is_an_error() {
        assert_eq!(extract_decisions("", &AnchorSet::default()), Err(EmptyTextError));
        assert_eq!(extract_decisions(" \n\t", &AnchorSet::default()), Err(EmptyTextError));
    }

    #[test]
    fn custom_anchor_lists_replace_defaults() {
        let anchors = AnchorSet {
            rate_decision: vec!["bank rate".into()],
            balance_sheet: vec![],
            forward_guidance: vec![],
        };
        let out = extract_decisions("The MPC held Bank Rate at 5%. The federal funds rate.", &anchors).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "The MPC held Bank Rate at 5%.");
    }
}
