//! Ledger API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory ledger seeded with accounts 0 and 1
//! cargo run --bin ledger-api
//!
//! # PostgreSQL ledger, JSON logs
//! API_STORE=postgres API_DATABASE_URL=postgres://... API_LOG_FORMAT=json cargo run --bin ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log filter when `RUST_LOG` is unset (default: info)
//! * `API_LOG_FORMAT` - `plain` or `json` (default: plain)
//! * `API_STORE` - `memory` or `postgres` (default: memory)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` / `API_DB_MIN_CONNECTIONS` - Pool sizing
//! * `API_JOURNAL_ENABLED` - Append a journal entry per transfer (default: true)
//! * `API_SEED_FILE` - JSON accounts for the memory store

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_ledger::{InMemoryLedgerStore, LedgerService, LedgerStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
use interface_api::config::{ApiConfig, LogFormat, StoreBackend};
use interface_api::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading API configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        journal_enabled = config.journal_enabled,
        "Starting ledger API server"
    );

    let store = build_store(&config).await?;
    let service = LedgerService::new(store, config.journal_enabled);
    let app = create_router(service);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over `log_level`
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Builds the configured ledger store
async fn build_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match config.store {
        StoreBackend::Memory => {
            let accounts = config.seed_accounts()?;
            tracing::info!(accounts = accounts.len(), "Using in-memory ledger store");
            Ok(Arc::new(InMemoryLedgerStore::with_accounts(accounts)))
        }
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::new(config.database_url.clone())
                .max_connections(config.db_max_connections)
                .min_connections(config.db_min_connections);
            let pool = create_pool(db_config).await?;
            run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL ledger store");
            Ok(Arc::new(PostgresLedgerStore::new(pool)))
        }
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
