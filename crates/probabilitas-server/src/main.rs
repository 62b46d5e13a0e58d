//! Probabilitas Server
//!
//! Serves the project workspace API, Naive Bayes analysis, and printable
//! analysis reports.

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use probabilitas_server::{create_router, AppState, Cli, ServerConfig};
use probabilitas_store::{load_or_default, save_if_changed, save_snapshot, ProjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting Probabilitas server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded from {}", cli.config);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Restore projects from the snapshot file, if configured
    let store = match &config.data_file {
        Some(path) => load_or_default(path)
            .with_context(|| format!("failed to load data file {}", path.display()))?,
        None => {
            warn!("No data file configured, projects will not survive a restart");
            ProjectStore::new()
        }
    };

    let addr: SocketAddr = config.bind_addr().parse()?;
    let data_file = config.data_file.clone();
    let save_interval = config.save_interval_secs;
    let state = AppState::new(config, store, Some(metrics_handle))?;
    let store = state.store.clone();

    let autosave = match &data_file {
        Some(path) if save_interval > 0 => Some(spawn_autosave(
            store.clone(),
            path.clone(),
            Duration::from_secs(save_interval),
        )),
        _ => None,
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    if let Some(task) = autosave {
        task.abort();
        let _ = task.await;
    }

    if let Some(path) = data_file {
        save_snapshot(&store, &path)
            .with_context(|| format!("failed to save data file {}", path.display()))?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically write the store to `path` when it has changed
fn spawn_autosave(store: Arc<ProjectStore>, path: PathBuf, period: Duration) -> JoinHandle<()> {
    info!(path = %path.display(), period_secs = period.as_secs(), "autosave enabled");
    tokio::spawn(async move {
        let mut saved_revision = store.revision();
        let mut ticker = tokio::time::interval(period);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match save_if_changed(&store, &path, saved_revision) {
                Ok(Some(revision)) => saved_revision = revision,
                Ok(None) => {}
                Err(e) => warn!("Autosave failed: {}", e),
            }
        }
    })
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("probabilitas=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("probabilitas=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "probabilitas_requests_total",
        "Total number of requests processed by endpoint"
    );
    metrics::describe_counter!(
        "probabilitas_evaluations_total",
        "Total number of successful evaluations"
    );
    metrics::describe_counter!(
        "probabilitas_evaluation_errors_total",
        "Total number of rejected evaluations"
    );
    metrics::describe_histogram!(
        "probabilitas_evaluation_latency_us",
        metrics::Unit::Microseconds,
        "Engine evaluation latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
