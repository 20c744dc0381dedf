use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the monitor series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("statements_processed_total", "Statements scored and stored.");
    describe_counter!("stance_alerts_total", "Stance-shift alerts raised.");
    describe_counter!("monitor_runs_total", "Monitor cycles, labelled by status.");
    describe_gauge!("monitor_last_run_ts", "Unix time of the last finished monitor cycle.");
    describe_gauge!("last_tightening_score", "Tightening score of the newest processed statement.");
}
