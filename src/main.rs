use chrono::Utc;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reef_monitor::common::AppState;
use reef_monitor::config::{Config, ConfigError, StoreBackend};
use reef_monitor::routes;
use reef_monitor::store::{MemoryReadingStore, PostgresReadingStore, ReadingStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reef_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting reef-monitor...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    let series: Vec<&str> = config.metrics.averaged().map(|m| m.key()).collect();
    tracing::info!(
        deployment = ?config.deployment,
        backend = ?config.store_backend,
        host = %config.api_host,
        port = config.api_port,
        reading_limit = config.reading_limit,
        series = ?series,
        "Configuration loaded"
    );

    // Open the reading store once; every request shares this handle
    let store: Arc<dyn ReadingStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;

            tracing::info!("Connecting to database...");
            let db = Database::connect(url).await?;
            tracing::info!("Database connection established");

            if config.run_migrations {
                tracing::info!("Running migrations...");
                migration::Migrator::up(&db, None).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(PostgresReadingStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!(
                seed_minutes = config.memory_seed_minutes,
                "Using in-memory reading store, data is not persisted"
            );
            Arc::new(MemoryReadingStore::seeded(
                Utc::now(),
                config.memory_seed_minutes,
            ))
        }
    };

    // Create application state
    let state = AppState::new(store, config.clone());

    // Build router
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
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
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
