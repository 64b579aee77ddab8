use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use casescreen::api::routes::{create_router, AppState};
use casescreen::batch::BatchEvaluator;
use casescreen::config::Config;
use casescreen::observability::{init_tracing, MetricsRegistry};
use casescreen::policy::ConfigLoader;
use casescreen::storage::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting casescreen"
    );

    // Rules are re-read on every import; this only surfaces a bad file early
    let loader = ConfigLoader::new(&config.rules_path);
    match loader.load() {
        Ok(rules) => info!(
            path = %config.rules_path.display(),
            inclusion_rules = rules.inclusion_rules.len(),
            excluded_statuses = rules.excluded_statuses.len(),
            "Rule config found"
        ),
        Err(e) => warn!(
            path = %config.rules_path.display(),
            error = %e,
            "Rule config not loadable yet, imports will fail until fixed"
        ),
    }

    // Create application state
    let state = Arc::new(AppState {
        store: Arc::new(InMemoryStore::new()),
        loader,
        evaluator: BatchEvaluator::new(config.parallel_threshold),
        metrics: Arc::new(MetricsRegistry::new()),
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    // Create router
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(CompressionLayer::new())
            .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
    );

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
