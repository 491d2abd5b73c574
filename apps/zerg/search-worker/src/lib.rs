//! Search Worker Service
//!
//! A background worker that drains the vtree summary-then-page search job
//! stream, running each job through the two-stage retrieval pipeline and
//! the relevance filter.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (stream_search)
//!   ↓ (Consumer Group: consumer_group)
//! SearchWorker
//!   ↓ (summary ANN -> page scan -> relevance filter)
//! SearchPipeline<PgSearchRepository, HttpRelevanceJudge>
//!   ↓
//! PostgreSQL (summary_table / page_table, per job payload)
//! ```
//!
//! ## Features
//!
//! - Consumer-group delivery with bounded retries and dead-lettering
//! - Cooperative cancellation checked at pipeline stage boundaries
//! - Health check / Prometheus metrics endpoint for operators
//! - Graceful shutdown handling

use std::sync::Arc;

use core_config::{app_info, Environment, FromEnv};
use domain_search_jobs::{
    HttpRelevanceJudge, JobQueueAdapter, PgSearchRepository, SearchEngineConfig, SearchPipeline,
    SearchWorker,
};
use eyre::{Result, WrapErr};
use stream_worker::{health_router, metrics, HealthState};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Starts the health/metrics HTTP server.
///
/// DLQ admin endpoints from `stream-worker` are intentionally not mounted
/// here: they assume `stream-worker`'s own DLQ entry envelope
/// (`DlqEntry`/`data` field), which does not match the flat field layout
/// `JobQueueAdapter::move_to_dlq` writes.
async fn start_health_server(health_state: HealthState, port: u16) -> Result<()> {
    let app = health_router(health_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {addr}"))?;

    info!(port = %port, "Health server listening");

    axum::serve(listener, app)
        .await
        .wrap_err("Health server failed")?;

    Ok(())
}

/// Runs the search worker.
///
/// 1. Initializes structured logging and Prometheus metrics.
/// 2. Loads [`SearchEngineConfig`] from the environment.
/// 3. Connects to Redis and ensures the consumer group exists.
/// 4. Wires the Postgres-backed pipeline and HTTP relevance judge.
/// 5. Drains `stream_search` until asked to shut down.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);
    metrics::init_metrics();

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting search worker service");
    info!("Environment: {:?}", environment);

    let health_port: u16 = std::env::var("SEARCH_WORKER_HEALTH_PORT")
        .or_else(|_| std::env::var("HEALTH_PORT"))
        .unwrap_or_else(|_| "8083".to_string())
        .parse()
        .unwrap_or(8083);

    let config = SearchEngineConfig::from_env().wrap_err("Failed to load search engine config")?;

    info!("Connecting to Redis...");
    let redis_url = config.redis.to_url();
    let redis = database::redis::connect_with_retry(&redis_url, None)
        .await
        .wrap_err("Failed to connect to Redis")?;
    info!("Connected to Redis successfully");

    let queue = JobQueueAdapter::new(redis.clone(), config.redis.clone());
    queue
        .ensure_consumer_group()
        .await
        .wrap_err("Failed to ensure consumer group")?;

    let repository = Arc::new(PgSearchRepository::new());
    let judge = Arc::new(
        HttpRelevanceJudge::from_env().wrap_err("Failed to load relevance judge configuration")?,
    );
    let pipeline = Arc::new(SearchPipeline::new(repository, judge));
    let worker = SearchWorker::new(queue, pipeline, config.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    let health_state = HealthState::with_dlq_stream(
        Arc::new(redis),
        app_info.name,
        app_info.version,
        config.redis.stream_search.clone(),
        config.redis.stream_search_dlq.clone(),
    );

    let health_state_clone = health_state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state_clone, health_port).await {
            error!(error = %e, "Health server failed");
        }
    });

    let consumer_name = std::env::var("SEARCH_WORKER_CONSUMER_NAME")
        .unwrap_or_else(|_| format!("search-worker-{}", std::process::id()));

    info!(consumer = %consumer_name, "Starting search job consumer loop...");
    worker
        .run_worker_until_shutdown(&consumer_name, shutdown_rx)
        .await
        .map_err(|e| eyre::eyre!("{}", e))?;

    info!("Search worker service stopped");
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        },
    }

    Ok(())
}
