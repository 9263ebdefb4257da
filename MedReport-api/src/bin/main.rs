use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use med_report_api::api::{create_app, AppState};
use med_report_api::config::AppConfig;
use med_report_data::database;
use med_report_domain::auth::token_blacklist;

const BLACKLIST_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// The main entry point for the MedReport API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Initializes the database connection pool, falling back to in-memory storage
/// 4. Creates and starts the Axum web application
/// 5. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting MedReport Analyzer API server");

    let config = AppConfig::from_env()?;

    let pool = match database::initialize_database_pool(&config.database) {
        Ok(pool) => {
            match database::get_connection_info(&pool) {
                Ok(info) => info!("Database ready: {}", info),
                Err(e) => warn!("Database pool created but not reachable: {}", e),
            }
            Some(pool)
        }
        Err(e) => {
            // Keep serving on in-memory storage; health reports degraded.
            error!("Failed to initialize database pool: {}. Falling back to in-memory storage", e);
            None
        }
    };

    let state = AppState::new(pool, &config);
    let app = create_app(state, &config.cors_allowed_origin);

    tokio::spawn(async {
        let mut interval = tokio::time::interval(BLACKLIST_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = token_blacklist::blacklist().cleanup_expired_tokens();
            debug!(
                "Removed {} expired tokens, {} remain in blacklist",
                removed,
                token_blacklist::blacklist().size()
            );
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
