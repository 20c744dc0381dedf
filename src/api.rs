use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::model::{ShiftResult, Statement};
use crate::monitor::{CycleOptions, CycleReport, CycleStatus, Monitor};
use crate::pipeline::{analyze_statement, StatementInput};
use crate::settings::Settings;
use crate::summary::AlertSummary;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub settings: &'static Settings,
}

impl AppState {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        let settings = monitor.settings();
        Self { monitor, settings }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/monitor", get(run_monitor).post(run_monitor))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `?force=true&debug=true`; anything but "true" (any case) or "1" is false.
#[derive(Debug, Default, Deserialize)]
struct MonitorQuery {
    force: Option<String>,
    debug: Option<String>,
}

fn flag(v: &Option<String>) -> bool {
    v.as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("true") || s == "1")
}

#[derive(Serialize)]
struct MonitorResp {
    timestamp: String,
    results: CycleReport,
}

#[derive(Serialize)]
struct CycleErrorResp {
    status: CycleStatus,
    error: String,
}

async fn run_monitor(State(state): State<AppState>, Query(q): Query<MonitorQuery>) -> Response {
    let opts = CycleOptions {
        force: flag(&q.force),
        debug: flag(&q.debug),
    };
    match state.monitor.run_cycle(opts).await {
        Ok(results) => Json(MonitorResp {
            timestamp: Utc::now().to_rfc3339(),
            results,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "monitor cycle failed");
            let body = CycleErrorResp {
                status: CycleStatus::Error,
                error: format!("{e:#}"),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

#[derive(Deserialize)]
struct AnalyzeReq {
    date: NaiveDate,
    url: String,
    text: String,
    #[serde(default)]
    previous: Option<Statement>,
}

#[derive(Serialize)]
struct AnalyzeResp {
    statement: Statement,
    #[serde(skip_serializing_if = "Option::is_none")]
    shift: Option<ShiftResult>,
    summary: AlertSummary,
    alert_text: String,
}

#[derive(Serialize)]
struct ErrorResp {
    error: String,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Response {
    let input = StatementInput {
        date: body.date,
        url: body.url,
        raw_text: body.text,
    };
    match analyze_statement(input, body.previous.as_ref(), state.settings) {
        Ok(a) => {
            let alert_text = a.alert_text();
            Json(AnalyzeResp {
                statement: a.statement,
                shift: a.shift,
                summary: a.summary,
                alert_text,
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResp {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flags() {
        assert!(flag(&Some("true".into())));
        assert!(flag(&Some("TRUE".into())));
        assert!(flag(&Some("1".into())));
        assert!(!flag(&Some("yes".into())));
        assert!(!flag(&None));
    }
}
