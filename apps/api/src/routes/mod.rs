pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, Uri},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::analysis::handlers as jobs;
use crate::auth::handlers as auth;
use crate::errors::AppError;
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;
use crate::users::handlers as users;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Set on every response, errors and 429s included.
const SECURITY_HEADERS: [(&str, &str); 11] = [
    ("content-security-policy", "default-src 'self'; frame-ancestors 'self'; object-src 'none'"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {method} {} not found", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/profile", get(auth::handle_get_profile))
        // Jobs
        .route("/api/jobs/analyze", post(jobs::handle_analyze_job))
        .route("/api/jobs/applications", get(jobs::handle_list_applications))
        .route("/api/jobs/applications/:id", get(jobs::handle_get_application))
        .route(
            "/api/jobs/applications/:id/status",
            patch(jobs::handle_update_status),
        )
        // Users
        .route("/api/users/profile", patch(users::handle_update_profile))
        .route("/api/users/skills", post(users::handle_add_skill))
        .route(
            "/api/users/skills/:skill_name",
            delete(users::handle_remove_skill),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    with_security_headers(router)
}

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::testing::{
        sample_analysis_json, sample_learning_plan_json, sample_profile_json, test_state,
    };

    const NO_REPLIES: [&str; 0] = [];

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn register(app: &Router, email: &str) -> (StatusCode, Value) {
        send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": "hunter22",
                "profile": sample_profile_json()
            })),
        )
        .await
    }

    async fn register_token(app: &Router, email: &str) -> String {
        let (status, body) = register(app, email).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    fn analysis_replies(runs: usize) -> Vec<String> {
        (0..runs)
            .flat_map(|_| [sample_analysis_json(), sample_learning_plan_json()])
            .collect()
    }

    async fn analyze(app: &Router, token: &str, title: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/jobs/analyze",
            Some(token),
            Some(json!({
                "jobDescription": "Senior Rust engineer with PostgreSQL",
                "jobTitle": title,
                "companyName": "Acme"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn test_health_reports_environment() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "test");
        assert!(body["timestamp"].is_string());
    }

    async fn response_headers(app: &Router, uri: &str) -> (StatusCode, header::HeaderMap) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (response.status(), response.headers().clone())
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let app = build_router(test_state(NO_REPLIES, 2));

        for (uri, expected) in [
            ("/health", StatusCode::OK),
            ("/api/nope", StatusCode::NOT_FOUND),
            ("/health", StatusCode::TOO_MANY_REQUESTS),
        ] {
            let (status, headers) = response_headers(&app, uri).await;
            assert_eq!(status, expected, "{uri}");
            assert_eq!(headers["x-content-type-options"], "nosniff");
            assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
            assert_eq!(headers["referrer-policy"], "no-referrer");
            assert_eq!(headers["x-xss-protection"], "0");
            for (name, _) in SECURITY_HEADERS {
                assert!(headers.contains_key(name), "{name} missing on {uri}");
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let (status, body) = send(&app, "GET", "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Route GET /api/nope not found");
    }

    #[tokio::test]
    async fn test_register_login_profile_flow() {
        let app = build_router(test_state(NO_REPLIES, 100));

        let (status, body) = register(&app, "ada@example.com").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["profile"]["firstName"], "Ada");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
        let user_id = body["user"]["id"].clone();

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_conflict() {
        let app = build_router(test_state(NO_REPLIES, 100));
        register_token(&app, "ada@example.com").await;

        let (status, body) = register(&app, "ada@example.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_invalid_registration_body_is_validation_error() {
        let app = build_router(test_state(NO_REPLIES, 100));

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "hunter22", "profile": sample_profile_json()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "123", "profile": sample_profile_json()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let mut profile = sample_profile_json();
        profile["experience"] = json!("wizard");
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter22", "profile": profile})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_register_rejects_repeated_or_blank_skill_names() {
        let app = build_router(test_state(NO_REPLIES, 100));

        let mut profile = sample_profile_json();
        profile["skills"][1]["name"] = json!("Rust");
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter22", "profile": profile})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(
            body["error"]["message"].as_str().unwrap().contains("duplicate skill name 'Rust'"),
            "{body}"
        );

        let mut profile = sample_profile_json();
        profile["lastName"] = json!("  ");
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter22", "profile": profile})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        // Nothing was stored, so the address is still free.
        register_token(&app, "ada@example.com").await;
    }

    #[tokio::test]
    async fn test_bad_password_and_unknown_email_look_identical() {
        let app = build_router(test_state(NO_REPLIES, 100));
        register_token(&app, "ada@example.com").await;

        let wrong_password = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-pass"})),
        )
        .await;
        let unknown_email = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "bob@example.com", "password": "hunter22"})),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn test_missing_token_is_401_and_bad_token_is_403() {
        let app = build_router(test_state(NO_REPLIES, 100));

        let (status, body) = send(&app, "GET", "/api/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, body) = send(&app, "GET", "/api/auth/profile", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_analyze_list_get_and_update_status() {
        let app = build_router(test_state(analysis_replies(2), 100));
        let token = register_token(&app, "ada@example.com").await;

        let first = analyze(&app, &token, "Backend Engineer").await;
        assert_eq!(first["message"], "Job analyzed successfully");
        assert_eq!(first["analysis"]["matchScore"], 59);
        assert_eq!(first["analysis"]["status"], "analyzed");
        assert_eq!(first["analysis"]["learningPlan"]["phases"][0]["resources"][0]["type"], "documentation");
        let second = analyze(&app, &token, "Platform Engineer").await;

        let (status, body) = send(&app, "GET", "/api/jobs/applications", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["applications"][0]["id"], second["analysis"]["id"]);
        assert_eq!(body["applications"][1]["id"], first["analysis"]["id"]);

        let id = first["analysis"]["id"].as_str().unwrap();
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/jobs/applications/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["application"]["jobTitle"], "Backend Engineer");

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/jobs/applications/{id}/status"),
            Some(&token),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Application status updated");
        assert_eq!(body["application"]["status"], "completed");

        // Any transition is allowed, including back to the start.
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/jobs/applications/{id}/status"),
            Some(&token),
            Some(json!({"status": "analyzed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["application"]["status"], "analyzed");

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/jobs/applications/{id}/status"),
            Some(&token),
            Some(json!({"status": "archived"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_other_users_application_is_forbidden() {
        let app = build_router(test_state(analysis_replies(1), 100));
        let owner = register_token(&app, "ada@example.com").await;
        let intruder = register_token(&app, "eve@example.com").await;

        let created = analyze(&app, &owner, "Backend Engineer").await;
        let id = created["analysis"]["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/jobs/applications/{id}"),
            Some(&intruder),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/jobs/applications/{id}/status"),
            Some(&intruder),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = send(&app, "GET", "/api/jobs/applications", Some(&intruder), None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_missing_application_is_404() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/jobs/applications/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analysis_failure_is_500_and_stores_nothing() {
        let app = build_router(test_state(["not json"], 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/jobs/analyze",
            Some(&token),
            Some(json!({"jobDescription": "Rust", "jobTitle": "Engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "ANALYSIS_ERROR");

        let (_, body) = send(&app, "GET", "/api/jobs/applications", Some(&token), None).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_blank_job_description_rejected() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/jobs/analyze",
            Some(&token),
            Some(json!({"jobDescription": "   ", "jobTitle": "Engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_profile_update_merges_fields() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/users/profile",
            Some(&token),
            Some(json!({"title": "Staff Engineer", "experience": "senior"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["user"]["profile"]["title"], "Staff Engineer");
        assert_eq!(body["user"]["profile"]["experience"], "senior");
        assert_eq!(body["user"]["profile"]["firstName"], "Ada");
        assert_eq!(body["user"]["profile"]["skills"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_profile_update_rejects_repeated_skill_names() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "PATCH",
            "/api/users/profile",
            Some(&token),
            Some(json!({"skills": [
                {"name": "Go", "category": "programming", "proficiency": "beginner"},
                {"name": "Go", "category": "programming", "proficiency": "advanced"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
        let names: Vec<&str> = body["user"]["profile"]["skills"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Rust", "Docker"]);
    }

    #[tokio::test]
    async fn test_blank_skill_name_rejected() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/skills",
            Some(&token),
            Some(json!({"name": "   ", "category": "tools", "proficiency": "beginner"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_add_and_remove_skills() {
        let app = build_router(test_state(NO_REPLIES, 100));
        let token = register_token(&app, "ada@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/skills",
            Some(&token),
            Some(json!({"name": "PostgreSQL", "category": "database", "proficiency": "beginner"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Skill added successfully");
        assert_eq!(body["skills"].as_array().unwrap().len(), 3);

        // Same name replaces rather than duplicates.
        let (_, body) = send(
            &app,
            "POST",
            "/api/users/skills",
            Some(&token),
            Some(json!({"name": "PostgreSQL", "category": "database", "proficiency": "advanced"})),
        )
        .await;
        let skills = body["skills"].as_array().unwrap();
        assert_eq!(skills.len(), 3);
        assert_eq!(skills[2]["proficiency"], "advanced");

        let (status, body) = send(&app, "DELETE", "/api/users/skills/Docker", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Skill removed successfully");
        let names: Vec<&str> = body["skills"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Rust", "PostgreSQL"]);

        let (status, after) = send(&app, "DELETE", "/api/users/skills/COBOL", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["skills"], body["skills"]);
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429() {
        let app = build_router(test_state(NO_REPLIES, 2));

        assert_eq!(send(&app, "GET", "/health", None, None).await.0, StatusCode::OK);
        assert_eq!(send(&app, "GET", "/health", None, None).await.0, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(
            body["error"]["message"],
            "Too many requests from this IP, please try again later."
        );
    }
}
