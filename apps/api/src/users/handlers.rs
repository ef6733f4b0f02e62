use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ValidatedJson;
use crate::models::user::{ProfileUpdate, PublicUser, Skill};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileUpdatedResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub message: &'static str,
    pub skills: Vec<Skill>,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// PATCH /api/users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> Result<Json<ProfileUpdatedResponse>, AppError> {
    let user = state
        .users
        .update_profile(auth.user_id, update)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully",
        user: user.into_public(),
    }))
}

/// POST /api/users/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(skill): ValidatedJson<Skill>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = state
        .users
        .upsert_skill(auth.user_id, skill)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(SkillsResponse {
        message: "Skill added successfully",
        skills,
    }))
}

/// DELETE /api/users/skills/:skill_name
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(skill_name): Path<String>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = state
        .users
        .remove_skill(auth.user_id, &skill_name)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(SkillsResponse {
        message: "Skill removed successfully",
        skills,
    }))
}
