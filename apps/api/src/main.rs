mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod llm_client;
mod models;
mod rate_limit;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::rate_limit::{InMemoryRateLimiter, RateLimitPolicy, RateLimiter, RedisRateLimiter};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgApplicationStore, PgUserStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Job-Prep API v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.app_env
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize rate limiter
    let rate_limiter = build_rate_limiter(&config).await;

    let state = AppState {
        users: Arc::new(PgUserStore::new(db.clone())),
        applications: Arc::new(PgApplicationStore::new(db)),
        llm,
        tokens: TokenSigner::new(&config.jwt_secret),
        config: config.clone(),
        rate_limiter,
    };

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Redis when configured and reachable; otherwise counters stay in process.
async fn build_rate_limiter(config: &Config) -> Arc<dyn RateLimiter> {
    let policy = RateLimitPolicy {
        window_secs: config.rate_limit_window_secs,
        max: config.rate_limit_max,
    };

    if let Some(url) = &config.redis_url {
        match RedisRateLimiter::connect(url, policy).await {
            Ok(limiter) => {
                info!("Rate limiter using Redis");
                return Arc::new(limiter);
            }
            Err(e) => warn!("Redis unavailable ({e}); falling back to in-process rate limiting"),
        }
    }

    info!("Rate limiter using in-process counters");
    Arc::new(InMemoryRateLimiter::new(policy))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
