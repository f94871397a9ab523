use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bidwork_api::config::{ServerConfig, StoreBackend};
use bidwork_api::router::build_app_router;
use bidwork_api::state::AppState;
use bidwork_events::{
    EventBus, EventPersistence, NotificationRelay, NotificationSink, TracingSink,
};
use bidwork_lifecycle::{Marketplace, MarketplaceStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bidwork_api=debug,bidwork_lifecycle=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store_backend,
        "Loaded server configuration"
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();
    let mut background = Vec::new();

    // --- Store ---
    let store: Arc<dyn MarketplaceStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is checked when loading configuration");
            let pool = bidwork_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            bidwork_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            bidwork_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            background.push(tokio::spawn(EventPersistence::run(
                pool.clone(),
                event_bus.subscribe(),
                cancel.clone(),
            )));
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    // Notification delivery never blocks the request that produced the event.
    let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(TracingSink)];
    let relay = NotificationRelay::new(sinks);
    background.push(tokio::spawn(
        relay.run(event_bus.subscribe(), cancel.clone()),
    ));
    tracing::info!(
        tasks = background.len(),
        subscribers = event_bus.subscriber_count(),
        "Event services started"
    );

    // --- App state ---
    let marketplace = Arc::new(Marketplace::new(store, event_bus.clone()));
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let config = Arc::new(config);
    let state = AppState {
        marketplace,
        config: Arc::clone(&config),
        event_bus,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    cancel.cancel();
    for handle in background {
        if tokio::time::timeout(shutdown_timeout, handle).await.is_err() {
            tracing::warn!("Event service did not stop within the shutdown timeout");
        }
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
