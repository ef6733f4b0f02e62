//! Fixed-window request limit per client IP.
//!
//! Each IP gets `max` requests per window of `window_secs`. Counters live in
//! Redis when it is configured and in a process-local map otherwise.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub window_secs: u64,
    pub max: u64,
}

impl RateLimitPolicy {
    fn window_index(&self, now_secs: u64) -> u64 {
        now_secs / self.window_secs.max(1)
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request from `client` and returns the count so far in the current window.
    async fn hit(&self, client: &str) -> anyhow::Result<u64>;

    fn policy(&self) -> RateLimitPolicy;
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    policy: RateLimitPolicy,
}

impl RedisRateLimiter {
    pub async fn connect(redis_url: &str, policy: RateLimitPolicy) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, policy })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, client: &str) -> anyhow::Result<u64> {
        let mut conn = self.conn.clone();
        let key = format!("ratelimit:{client}:{}", self.policy.window_index(now_secs()));

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            let ttl = i64::try_from(self.policy.window_secs).unwrap_or(i64::MAX);
            let _: () = conn.expire(&key, ttl).await?;
        }
        Ok(count)
    }

    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process
// ────────────────────────────────────────────────────────────────────────────

pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    /// client -> (window index, count)
    counters: Mutex<HashMap<String, (u64, u64)>>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            counters: Mutex::new(HashMap::new()),
        }
    }

    async fn hit_at(&self, client: &str, now_secs: u64) -> u64 {
        let window = self.policy.window_index(now_secs);
        let mut counters = self.counters.lock().await;

        // Drop counters from finished windows
        counters.retain(|_, (w, _)| *w == window);

        let entry = counters.entry(client.to_string()).or_insert((window, 0));
        entry.1 += 1;
        entry.1
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn hit(&self, client: &str) -> anyhow::Result<u64> {
        Ok(self.hit_at(client, now_secs()).await)
    }

    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Middleware
// ────────────────────────────────────────────────────────────────────────────

/// Peer address when the server was started with connect info, else the first
/// `X-Forwarded-For` entry, else a shared "unknown" bucket.
fn client_ip(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_ip(&req);

    match state.rate_limiter.hit(&client).await {
        Ok(count) if count > state.rate_limiter.policy().max => {
            warn!("Rate limit exceeded for {client}");
            return AppError::RateLimited.into_response();
        }
        Ok(_) => {}
        Err(e) => warn!("Rate limiter unavailable, allowing request: {e}"),
    }

    next.run(req).await
}
