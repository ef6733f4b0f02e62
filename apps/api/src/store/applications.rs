use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analysis::learning_plan::LearningPlan;
use crate::analysis::matcher::JobAnalysis;
use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, JobApplication, NewJobApplication};
use crate::store::ApplicationStore;

const APPLICATION_COLUMNS: &str = "id, user_id, job_description, job_title, company_name, \
    match_score, analysis, learning_plan, status, created_at, updated_at";

#[derive(FromRow)]
struct JobApplicationRow {
    id: Uuid,
    user_id: Uuid,
    job_description: String,
    job_title: String,
    company_name: Option<String>,
    match_score: i16,
    analysis: Json<JobAnalysis>,
    learning_plan: Json<LearningPlan>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobApplicationRow> for JobApplication {
    type Error = AppError;

    fn try_from(row: JobApplicationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt application {}: {e}", row.id)))?;
        let match_score = u8::try_from(row.match_score).map_err(|_| {
            AppError::Internal(anyhow::anyhow!(
                "Corrupt application {}: match_score {} out of range",
                row.id,
                row.match_score
            ))
        })?;

        Ok(JobApplication {
            id: row.id,
            user_id: row.user_id,
            job_description: row.job_description,
            job_title: row.job_title,
            company_name: row.company_name,
            match_score,
            analysis: row.analysis.0,
            learning_plan: row.learning_plan.0,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Job applications table; analysis and learning plan are JSONB documents.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn create(&self, application: NewJobApplication) -> Result<JobApplication, AppError> {
        let sql = format!(
            r#"
            INSERT INTO job_applications
                (id, user_id, job_description, job_title, company_name,
                 match_score, analysis, learning_plan, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row: JobApplicationRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(application.user_id)
            .bind(&application.job_description)
            .bind(&application.job_title)
            .bind(&application.company_name)
            .bind(i16::from(application.match_score))
            .bind(Json(&application.analysis))
            .bind(Json(&application.learning_plan))
            .bind(ApplicationStatus::default().as_str())
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<JobApplication>, AppError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<JobApplicationRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(JobApplication::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobApplication>, AppError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE id = $1");
        let row: Option<JobApplicationRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(JobApplication::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<JobApplication>, AppError> {
        let sql = format!(
            "UPDATE job_applications SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        );
        let row: Option<JobApplicationRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(JobApplication::try_from).transpose()
    }
}
