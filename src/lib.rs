// src/lib.rs
// Public library surface for the binaries and integration tests.

// Analysis core (pure, no I/O)
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod shift;
pub mod summary;
pub mod text;

// Configuration
pub mod settings;

// Retrieval, storage, alerts, HTTP
pub mod api;
pub mod history;
pub mod ingest;
pub mod metrics;
pub mod monitor;
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::{ConfigError, EmptyTextError};
pub use crate::extract::{extract_decisions, AnchorSet};
pub use crate::lexicon::{Lexicon, Polarity};
pub use crate::model::{
    Decision, DecisionCategory, Direction, Magnitude, ScoreResult, ShiftResult, Statement,
};
pub use crate::monitor::{CycleOptions, CycleReport, Monitor};
pub use crate::notify::{AlertEvent, Notifier, NotifierMux};
pub use crate::pipeline::{analyze_statement, AlertPolicy, Analysis, StatementInput};
pub use crate::scoring::{score_text, ScoringCfg};
pub use crate::settings::Settings;
pub use crate::shift::{detect_shift, ShiftThresholds};
pub use crate::summary::{build_summary, AlertSummary};
