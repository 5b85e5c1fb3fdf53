//! Gavel - auction listing backend.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `PostgreSQL` for users, items, and images
//! - In-process session store with background expiry sweeping
//! - Uploaded photos stored on the local filesystem, served under `/public`
//!
//! Every request passes through the session gate; handlers receive the
//! resolved identity through extractors.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::{Router, routing::get};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gavel_server::config::ServerConfig;
use gavel_server::state::AppState;
use gavel_server::{db, middleware, routes, sessions};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gavel_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Build application state
    let state = AppState::new(config, pool);
    state
        .uploads()
        .ensure_dirs()
        .await
        .expect("Failed to create upload directory");

    // Background session expiry sweeper
    let sweeper = sessions::spawn_sweeper(Arc::clone(state.sessions()));

    // Build router
    let public_dir = state.config().public_dir.clone();
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(from_fn_with_state(state.clone(), middleware::session_gate))
        .layer(TraceLayer::new_for_http());

    // The reference front-end runs on another origin during development
    if !state.config().is_production() {
        app = app.layer(dev_cors());
    }

    let app = app.with_state(state.clone());

    // Start server
    let addr = state.config().socket_addr();
    tracing::info!("gavel listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Lifecycle teardown: stop the sweeper, then drop any live sessions
    sweeper.abort();
    let dropped = state.sessions().clear().await;
    tracing::info!(dropped, "Session store cleared");
}

/// Root document.
async fn root() -> &'static str {
    "gavel ok"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Permissive CORS for development: mirrors the caller's origin and allows
/// credentialed requests so the session cookie works cross-origin.
fn dev_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
