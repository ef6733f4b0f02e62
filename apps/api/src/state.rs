use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;
use crate::store::{ApplicationStore, UserStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub llm: LlmClient,
    pub tokens: TokenSigner,
    pub config: Config,
    /// Redis-backed when REDIS_URL is set, in-process otherwise.
    pub rate_limiter: Arc<dyn RateLimiter>,
}
