//! bank_ledger - Bank Ledger Backend API
//!
//! Mutates account balances under optimistic concurrency control and mirrors
//! each mutation into an audit trail through an asynchronous message channel.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_ledger::api;
use bank_ledger::audit::AuditSubscriber;
use bank_ledger::channel::BroadcastChannel;
use bank_ledger::db;
use bank_ledger::service::LedgerService;
use bank_ledger::store::{PgAuditStore, PgLedgerStore};
use bank_ledger::Config;

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting bank_ledger server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    // Verify database schema
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");

    // Wire collaborators explicitly: stores, channel, subscriber, service.
    let ledger_store = Arc::new(PgLedgerStore::new(pool.clone()));
    let audit_store = Arc::new(PgAuditStore::new(pool.clone()));
    let channel = Arc::new(BroadcastChannel::new());

    // The subscriber must exist before the first publish, or early audit
    // messages are dropped by the best-effort channel.
    let audit_task = AuditSubscriber::new(audit_store, &config).start(channel.as_ref());

    let service = Arc::new(LedgerService::new(ledger_store, channel, &config));

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::create_router())
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    audit_task.abort();
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
