//! Order Reconciler
//!
//! Connects to the order-update feed, reconciles every update through a
//! single engine task, and prints the accumulated results when the feed
//! closes.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tokio::sync::{mpsc, watch};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_reconciler::{
    report, Config, EngineStats, EngineTask, FeedManager, Publisher, ReconciliationEngine,
    Telemetry,
};

/// State behind the health and metrics endpoints
#[derive(Clone)]
struct HealthState {
    telemetry: Arc<Telemetry>,
    stats: watch::Receiver<EngineStats>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Arc::new(Config::load()?);

    init_tracing(config.log_json);
    info!("Starting Order Reconciler");
    info!(
        endpoint = %config.ws_endpoint,
        policy = ?config.modify_policy,
        "Configuration loaded"
    );

    let telemetry = Arc::new(Telemetry::new()?);
    let (stats_tx, stats_rx) = watch::channel(EngineStats::default());

    // Start health check server
    let health_state = HealthState {
        telemetry: telemetry.clone(),
        stats: stats_rx,
    };
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state, health_port).await {
            warn!(error = %e, "Health server error");
        }
    });

    // Engine task owns all reconciliation state
    let engine = ReconciliationEngine::with_policy(config.base_client_id, config.modify_policy);
    let mut task = EngineTask::new(engine)
        .with_telemetry(telemetry.clone())
        .with_stats(stats_tx);
    if let Some(path) = &config.ipc_socket_path {
        task = task.with_publisher(Publisher::new(path).await?);
    }

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let engine_handle = tokio::spawn(task.run(rx));

    // Run the feed until the server ends the stream
    let mut feed = FeedManager::new(config.clone(), tx, telemetry.clone());
    let feed_result = feed.run().await;
    drop(feed);

    let engine = engine_handle.await?;
    let report = engine.into_report();

    println!("{}", report::render(&report)?);
    if let Some(path) = &config.report_path {
        report::write_json(&report, path)?;
        info!(path = %path, "Report written");
    }

    if let Err(e) = &feed_result {
        error!(error = %e, "Feed stopped abnormally");
    }
    feed_result?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

/// Start HTTP server for health checks and metrics
async fn start_health_server(state: HealthState, port: u16) -> anyhow::Result<()> {
    use std::net::SocketAddr;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting health check server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<HealthState>) -> Json<serde_json::Value> {
    let stats = *state.stats.borrow();
    Json(serde_json::json!({
        "status": "healthy",
        "component": "order-reconciler",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "engine": stats,
        "rejected": state.telemetry.rejected(),
    }))
}

async fn metrics(State(state): State<HealthState>) -> Result<String, StatusCode> {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = state.telemetry.registry().gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
