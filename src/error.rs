//! Error taxonomy for the analysis core.
//!
//! The core itself fails in exactly one way (`EmptyTextError`); configuration
//! loading has its own `ConfigError`. Outer layers (ingest, history, api) work
//! with `anyhow::Result` and wrap these where needed.

use thiserror::Error;

/// Raw statement text was empty or whitespace-only.
///
/// Returned instead of degenerate defaults (score 50, no decisions) so callers
/// can tell "no signal found" apart from "nothing to analyze".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("statement text is empty or whitespace-only")]
pub struct EmptyTextError;

/// Rejected lexicon / monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lexicon term is empty")]
    EmptyTerm,
    #[error("lexicon term `{term}` has weight {weight}, expected 1..=10")]
    WeightOutOfRange { term: String, weight: i32 },
    #[error("lexicon term `{0}` is listed as both tightening and easing")]
    OverlappingTerm(String),
    #[error("lexicon term `{0}` is listed twice")]
    DuplicateTerm(String),
    #[error("invalid shift thresholds: {0}")]
    Thresholds(String),
    #[error("scale factor must be finite and > 0, got {0}")]
    Scale(f64),
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parsing monitor TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
