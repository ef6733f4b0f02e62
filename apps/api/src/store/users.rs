use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{NewUser, ProfileUpdate, Skill, User, UserProfile};
use crate::store::UserStore;

const USER_COLUMNS: &str = "id, email, password_hash, profile, created_at, updated_at";

/// Postgres error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    profile: Json<UserProfile>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            profile: row.profile.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Users table; the profile is one JSONB document per row.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, profile) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(Json(&user.profile))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("User already exists".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        // Top-level JSONB merge: present keys replace, absent keys are kept.
        let sql = format!(
            "UPDATE users SET profile = profile || $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(&update))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn upsert_skill(&self, id: Uuid, skill: Skill) -> Result<Option<Vec<Skill>>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET profile = jsonb_set(
                    profile,
                    '{{skills}}',
                    {kept} || jsonb_build_array($3::jsonb)
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
            kept = SKILLS_WITHOUT_NAME,
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&skill.name)
            .bind(Json(&skill))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.profile.0.skills))
    }

    async fn remove_skill(&self, id: Uuid, name: &str) -> Result<Option<Vec<Skill>>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET profile = jsonb_set(profile, '{{skills}}', {kept}),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
            kept = SKILLS_WITHOUT_NAME,
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.profile.0.skills))
    }
}

/// The stored skills array minus entries named `$2`, order preserved.
/// Evaluated inside the UPDATE so the read-modify-write is a single statement.
const SKILLS_WITHOUT_NAME: &str = r#"COALESCE(
    (SELECT jsonb_agg(s.value ORDER BY s.idx)
     FROM jsonb_array_elements(COALESCE(profile->'skills', '[]'::jsonb))
          WITH ORDINALITY AS s(value, idx)
     WHERE s.value->>'name' <> $2),
    '[]'::jsonb
)"#;
