//! Shared fixtures for unit and router tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::auth::TokenSigner;
use crate::config::{AiProvider, Config};
use crate::llm_client::{CompletionProvider, LlmClient, LlmError};
use crate::models::user::UserProfile;
use crate::rate_limit::{InMemoryRateLimiter, RateLimitPolicy};
use crate::state::AppState;
use crate::store::memory::{MemoryApplicationStore, MemoryUserStore};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Completion provider that replays canned replies in order and records prompts.
/// Once the queue is empty every call fails with `EmptyContent`.
#[derive(Default)]
pub struct StubProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl StubProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Every call fails as if the provider returned HTTP 500.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn model(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            });
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyContent)
    }
}

pub fn sample_profile_json() -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "experience": "mid",
        "skills": [
            {"name": "Rust", "category": "programming", "proficiency": "advanced", "yearsOfExperience": 3},
            {"name": "Docker", "category": "devops", "proficiency": "intermediate"}
        ],
        "workExperience": [{
            "company": "Analytical Engines Ltd",
            "position": "Engineer",
            "startDate": "2021-03-01",
            "description": "Built difference engines",
            "technologies": ["Rust"]
        }]
    })
}

pub fn sample_profile() -> UserProfile {
    serde_json::from_value(sample_profile_json()).unwrap()
}

/// One of two required skills matched, one year short: scores 59.
pub fn sample_analysis_json() -> String {
    r#"{
  "requiredSkills": ["Rust", "PostgreSQL"],
  "preferredSkills": ["Kubernetes"],
  "matchingSkills": ["Rust"],
  "missingSkills": ["PostgreSQL"],
  "experienceGap": 1,
  "strengthAreas": ["Systems programming"],
  "improvementAreas": ["Relational databases"],
  "jobLevel": "senior"
}"#
    .to_string()
}

pub fn sample_learning_plan_json() -> String {
    r#"{
  "timeframe": "2-3 months",
  "phases": [
    {
      "name": "Foundation Phase",
      "description": "Learn relational modelling and SQL",
      "estimatedHours": 40,
      "resources": [
        {
          "type": "documentation",
          "title": "PostgreSQL Tutorial",
          "url": "https://www.postgresql.org/docs/current/tutorial.html",
          "description": "Official tutorial",
          "estimatedHours": 10,
          "difficulty": "beginner",
          "provider": "PostgreSQL"
        }
      ],
      "projects": [
        {
          "name": "Inventory API",
          "description": "CRUD service backed by Postgres",
          "technologies": ["Rust", "PostgreSQL"],
          "estimatedHours": 20,
          "difficulty": "intermediate",
          "keyFeatures": ["migrations", "indexes"]
        }
      ],
      "milestones": ["Ship the inventory API"]
    }
  ],
  "totalEstimatedHours": 40,
  "priorityOrder": ["PostgreSQL"]
}"#
    .to_string()
}

pub fn test_config(rate_limit_max: u64) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ai_provider: AiProvider::OpenAi,
        ai_api_key: "sk-test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        app_env: "test".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        rate_limit_window_secs: 900,
        rate_limit_max,
    }
}

/// Fresh in-memory state. `llm_replies` are served to the stub provider in order.
pub fn test_state<I, S>(llm_replies: I, rate_limit_max: u64) -> AppState
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = test_config(rate_limit_max);
    let policy = RateLimitPolicy {
        window_secs: config.rate_limit_window_secs,
        max: config.rate_limit_max,
    };

    AppState {
        users: Arc::new(MemoryUserStore::default()),
        applications: Arc::new(MemoryApplicationStore::default()),
        llm: LlmClient::new(Arc::new(StubProvider::new(llm_replies))),
        tokens: TokenSigner::new(&config.jwt_secret),
        config,
        rate_limiter: Arc::new(InMemoryRateLimiter::new(policy)),
    }
}
