use anyhow::Context;
use chrono::Utc;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_watch_api::api::{routes::create_app, AppState};
use health_watch_api::api::handlers::SharedAlertService;
use health_watch_domain::config::EngineConfig;

/// The main entry point for the HealthWatch API server
///
/// Loads `.env`, installs tracing, opens the database pool, starts the
/// expired-alert purge task and serves the router until a shutdown signal.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Starting HealthWatch API server");

    let persistent = health_watch_domain::database::initialize_database_pool()
        .context("Failed to initialize database pool")?;
    if persistent {
        info!("Database pool initialized successfully");
    } else {
        warn!("Running without a database, data will not survive a restart");
    }

    let config = EngineConfig::from_env();
    let state = AppState::from_config(&config);
    let purge_task = tokio::spawn(purge_expired_alerts(
        state.alerts.clone(),
        Duration::from_secs(config.purge_interval_secs),
    ));

    let app = create_app(state).await;

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .context("PORT must be a number")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Periodically delete alerts whose expiry has passed
async fn purge_expired_alerts(alerts: SharedAlertService, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        if let Err(e) = alerts.purge_expired(Utc::now()).await {
            error!("Expired alert purge failed: {}", e);
        }
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutting down server...");
}
