//! Beacon — real-time per-user notification delivery service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use beacon_api::AppState;
use beacon_auth::JwtDecoder;
use beacon_cache::{CacheManager, EventStream, RedisClient};
use beacon_core::config::AppConfig;
use beacon_core::error::AppError;
use beacon_core::traits::cache::CacheProvider;
use beacon_core::traits::store::{NotificationStore, PreferencesStore};
use beacon_database::{DatabasePool, NotificationRepository, PreferencesRepository};
use beacon_queue::{EventListener, ExpirySweeper, GroupingEngine, QueueService, WorkerContext};
use beacon_realtime::{PresenceTracker, SocketRegistry};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing: JSON in production, pretty otherwise.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.server.is_production() {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

/// Connect, migrate, wire the pipeline, and serve until shutdown.
async fn run(config: AppConfig) -> Result<(), AppError> {
    // ── Stores ───────────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    beacon_database::migration::run_migrations(db.pool()).await?;

    let store: Arc<dyn NotificationStore> = Arc::new(NotificationRepository::new(
        db.pool().clone(),
        config.notifications.default_expiry_days,
    ));
    let preferences: Arc<dyn PreferencesStore> =
        Arc::new(PreferencesRepository::new(db.pool().clone()));

    // ── Cache, presence, registry ────────────────────────────
    let redis = RedisClient::connect(&config.redis).await?;
    let cache: Arc<dyn CacheProvider> = Arc::new(CacheManager::new(&config.cache, &redis)?);

    let registry = Arc::new(SocketRegistry::new(PresenceTracker::new(Arc::clone(&cache))));

    // ── Pipeline ─────────────────────────────────────────────
    let grouping = GroupingEngine::new(
        Arc::clone(&cache),
        Arc::clone(&store),
        Arc::clone(&registry),
        config.notifications.grouping_window_secs,
    );
    let ctx = Arc::new(WorkerContext {
        store: Arc::clone(&store),
        preferences: Arc::clone(&preferences),
        registry: Arc::clone(&registry),
        grouping,
    });

    let stream = Arc::new(EventStream::new(redis.clone()));
    let queue = Arc::new(QueueService::new(
        stream,
        ctx,
        config.notifications.queue_workers,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    queue.start(shutdown_rx.clone()).await?;

    let listener = EventListener::new(redis.clone(), Arc::clone(&queue));
    tokio::spawn(listener.start(shutdown_rx.clone()));

    let sweeper = ExpirySweeper::new(Arc::clone(&store));
    tokio::spawn(sweeper.run(shutdown_rx.clone()));

    // ── HTTP surface ─────────────────────────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        preferences,
        registry: Arc::clone(&registry),
        jwt: Arc::new(JwtDecoder::new(&config.auth)),
    };
    let app = beacon_api::build_router(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let tcp = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(port = config.server.port, mode = %config.server.mode, "Server starting");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx, registry))
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Server stopped gracefully");
    Ok(())
}

/// Wait for SIGINT/SIGTERM, then fan the shutdown out to every task.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>, registry: Arc<SocketRegistry>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutting down server...");
    let _ = shutdown_tx.send(true);

    // Open sockets would otherwise hold the connection drain forever.
    registry.close_all().await;
}
