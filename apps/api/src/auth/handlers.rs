use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::extractor::AuthUser;
use crate::auth::service::{self, AuthSession};
use crate::errors::AppError;
use crate::extract::ValidatedJson;
use crate::models::user::{PublicUser, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(nested)]
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

fn auth_response(message: &'static str, session: AuthSession) -> AuthResponse {
    AuthResponse {
        message,
        user: session.user.into_public(),
        token: session.token,
    }
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = service::register(
        state.users.as_ref(),
        &state.tokens,
        req.email,
        req.password,
        req.profile,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(auth_response("User registered successfully", session)),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let session = service::login(state.users.as_ref(), &state.tokens, &req.email, req.password).await?;
    Ok(Json(auth_response("Login successful", session)))
}

/// GET /api/auth/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        user: user.into_public(),
    }))
}
