// src/main.rs
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use service_status::{
    config,
    health::{build_aggregator, startup_gate, HealthCache},
    query::StatusService,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("service_status=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Optional config file; environment variables apply on top.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    match &config_path {
        Some(path) => info!("Loading configuration from: {}", path.display()),
        None => info!("No config file given, using defaults and environment"),
    }
    let settings = config::load_config(config_path.as_deref()).await?;

    let cache = Arc::new(HealthCache::new(settings.cache.ttl()));
    let aggregator = build_aggregator(&settings, cache)?;
    info!(
        probes = ?aggregator.probe_names().collect::<Vec<_>>(),
        ttl = ?settings.cache.ttl(),
        policy = ?settings.probes.failure_policy,
        "Health aggregator ready"
    );

    info!("Performing initial health check on startup...");
    match startup_gate(&aggregator).await {
        Ok(snapshot) => info!(
            services = snapshot.len(),
            "Initial health check complete. All services are OK."
        ),
        Err(err) => {
            for failure in err.failures() {
                error!(
                    service = failure.name(),
                    detail = failure.detail(),
                    "dependency unavailable at startup"
                );
            }
            eprintln!("FATAL: Application startup failed: {}", err);
            std::process::exit(err.exit_code());
        }
    }

    let service = Arc::new(StatusService::new(Arc::new(aggregator)));
    let handler = RequestHandler::new(service);

    ServerBuilder::new(settings.server.socket_addr()?)
        .with_handler(handler)
        .bind()
        .await?
        .serve_until(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(%err, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
