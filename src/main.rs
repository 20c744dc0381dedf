//! Fed stance monitor: binary entrypoint.
//! Boots the Axum HTTP server on Shuttle: settings, history, providers,
//! notifiers and the Prometheus exporter.

use std::sync::Arc;

use anyhow::Context;
use fed_stance_monitor::{
    api::{self, AppState},
    history::StatementHistory,
    ingest::{providers::fed_rss::FedRssProvider, types::StatementSource},
    metrics::Metrics,
    settings, Monitor, NotifierMux, Settings,
};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fed_stance_monitor=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = settings::init(Settings::from_env().context("loading monitor settings")?);

    let history_path = StatementHistory::default_path();
    let history = StatementHistory::load(&history_path).await?;

    let sources: Vec<Box<dyn StatementSource>> = vec![Box::new(FedRssProvider::from_env()?)];
    let monitor = Monitor::new(sources, history, settings).with_notifier(NotifierMux::from_env());

    let metrics = Metrics::init()?;
    let router = api::create_router(AppState::new(Arc::new(monitor))).merge(metrics.router());

    tracing::info!(history = %history_path.display(), "fed stance monitor ready");
    Ok(router.into())
}
