use anyhow::{bail, Context, Result};

/// Which hosted completion API the LLM client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Anthropic,
}

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Rate-limit counters live here when set; otherwise they are kept in process.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub ai_provider: AiProvider,
    pub ai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub frontend_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_secret = require_env("JWT_SECRET")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let (ai_provider, ai_api_key) = resolve_ai_provider(
            optional_env("AI_PROVIDER").as_deref(),
            optional_env("OPENAI_API_KEY"),
            optional_env("ANTHROPIC_API_KEY"),
        )?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            jwt_secret,
            ai_provider,
            ai_api_key,
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            rate_limit_max: parse_env("RATE_LIMIT_MAX", 100)?,
        })
    }
}

/// Picks the completion provider and its key.
///
/// An explicit `AI_PROVIDER` must have its key set. Without one, OpenAI wins
/// when both keys are present. No key at all is a startup error.
pub fn resolve_ai_provider(
    requested: Option<&str>,
    openai_key: Option<String>,
    anthropic_key: Option<String>,
) -> Result<(AiProvider, String)> {
    match requested.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("openai") => openai_key
            .map(|key| (AiProvider::OpenAi, key))
            .context("AI_PROVIDER=openai requires OPENAI_API_KEY"),
        Some("anthropic") => anthropic_key
            .map(|key| (AiProvider::Anthropic, key))
            .context("AI_PROVIDER=anthropic requires ANTHROPIC_API_KEY"),
        Some(other) => bail!("Unknown AI_PROVIDER '{other}' (expected 'openai' or 'anthropic')"),
        None => match (openai_key, anthropic_key) {
            (Some(key), _) => Ok((AiProvider::OpenAi, key)),
            (None, Some(key)) => Ok((AiProvider::Anthropic, key)),
            (None, None) => {
                bail!("At least one AI API key (OPENAI_API_KEY or ANTHROPIC_API_KEY) is required")
            }
        },
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
