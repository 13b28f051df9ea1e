use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alertdesk_api::config::{DeskConfig, ServerConfig};
use alertdesk_api::engine::{CorrelationEngine, ProblemCache};
use alertdesk_api::router::build_app_router;
use alertdesk_api::state::AppState;
use alertdesk_api::{auth, background};
use alertdesk_desk::SdpClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // `alertdesk-api hash-token <token>` prints the TOKEN_HASH for a token.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-token") {
        let token = args.get(2).expect("Usage: alertdesk-api hash-token <token>");
        let hash = auth::token::hash_token(token).expect("Failed to hash token");
        println!("{hash}");
        return;
    }

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let desk_config = DeskConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        desk_url = %desk_config.client.base_url,
        api_version = %desk_config.client.api_version,
        "Loaded desk configuration"
    );

    // --- Database ---
    let pool = alertdesk_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to open database");
    tracing::info!("Database connection pool created");

    alertdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    alertdesk_db::create_schema(&pool)
        .await
        .expect("Failed to create database schema");
    tracing::info!("Database schema ensured");

    // --- Problem cache ---
    let cache = Arc::new(ProblemCache::new());
    let cached = cache
        .refresh(&pool)
        .await
        .expect("Failed to load problem cache");
    tracing::info!(cached, "Problem cache loaded");

    // --- Correlation engine ---
    let desk = SdpClient::new(desk_config.client.clone()).expect("Failed to build desk client");
    let engine = Arc::new(CorrelationEngine::new(
        pool.clone(),
        Arc::clone(&cache),
        Arc::new(desk),
        desk_config.tickets,
        desk_config.client.timeout,
    ));

    // --- Background cache refresh ---
    let cancel = CancellationToken::new();
    let refresh_handle = (config.cache_refresh_secs > 0).then(|| {
        tokio::spawn(background::cache_refresh::run(
            Arc::clone(&cache),
            pool.clone(),
            Duration::from_secs(config.cache_refresh_secs),
            cancel.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        engine,
        cache,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
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
    if let Some(handle) = refresh_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Cache refresh job stopped");
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "alertdesk_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
