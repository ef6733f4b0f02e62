use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::analysis::orchestrator::{analyze_job, AnalyzeJobInput};
use crate::auth::ownership::authorize_owner;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ValidatedJson;
use crate::models::application::{ApplicationStatus, JobApplication};
use crate::models::user::not_blank;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeJobRequest {
    #[validate(custom(function = "not_blank", message = "jobDescription is required"))]
    pub job_description: String,
    #[validate(custom(function = "not_blank", message = "jobTitle is required"))]
    pub job_title: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub message: &'static str,
    pub analysis: JobApplication,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<JobApplication>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub application: JobApplication,
}

#[derive(Debug, Serialize)]
pub struct ApplicationUpdatedResponse {
    pub message: &'static str,
    pub application: JobApplication,
}

fn parse_application_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid application id '{raw}'")))
}

/// POST /api/jobs/analyze
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<AnalyzeJobRequest>,
) -> Result<(StatusCode, Json<AnalyzeJobResponse>), AppError> {
    let input = AnalyzeJobInput {
        user_id: auth.user_id,
        job_description: req.job_description,
        job_title: req.job_title,
        company_name: req.company_name.filter(|c| !c.trim().is_empty()),
    };

    let application = analyze_job(
        state.users.as_ref(),
        state.applications.as_ref(),
        &state.llm,
        input,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnalyzeJobResponse {
            message: "Job analyzed successfully",
            analysis: application,
        }),
    ))
}

/// GET /api/jobs/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let applications = state.applications.list_for_user(auth.user_id).await?;
    Ok(Json(ApplicationListResponse {
        total: applications.len(),
        applications,
    }))
}

/// GET /api/jobs/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let id = parse_application_id(&id)?;
    let application = authorize_owner(state.applications.find_by_id(id).await?, auth.user_id)?;
    Ok(Json(ApplicationResponse { application }))
}

/// PATCH /api/jobs/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<ApplicationUpdatedResponse>, AppError> {
    let id = parse_application_id(&id)?;
    authorize_owner(state.applications.find_by_id(id).await?, auth.user_id)?;

    let application = state
        .applications
        .update_status(id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Job application not found".to_string()))?;

    Ok(Json(ApplicationUpdatedResponse {
        message: "Application status updated",
        application,
    }))
}
