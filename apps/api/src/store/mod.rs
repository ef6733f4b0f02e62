//! Persistence seams. Handlers and the analysis pipeline only see these traits;
//! `main` wires the Postgres implementations, tests use the in-memory ones.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, JobApplication, NewJobApplication};
use crate::models::user::{NewUser, ProfileUpdate, Skill, User, UserProfile};

pub mod applications;
#[cfg(test)]
pub mod memory;
pub mod users;

pub use applications::PgApplicationStore;
pub use users::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. A duplicate email is `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Merges the present fields of `update` into the stored profile.
    /// `None` when the user does not exist.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate)
        -> Result<Option<User>, AppError>;

    /// Adds `skill`, replacing an existing skill with the same name.
    /// Returns the resulting skill list, `None` when the user does not exist.
    async fn upsert_skill(&self, id: Uuid, skill: Skill) -> Result<Option<Vec<Skill>>, AppError>;

    /// Removes skills named `name`; an unknown name is not an error.
    async fn remove_skill(&self, id: Uuid, name: &str) -> Result<Option<Vec<Skill>>, AppError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create(&self, application: NewJobApplication) -> Result<JobApplication, AppError>;

    /// All applications owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<JobApplication>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobApplication>, AppError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<JobApplication>, AppError>;
}

/// Convenience for callers that only need the profile.
pub async fn load_profile(users: &dyn UserStore, id: Uuid) -> Result<UserProfile, AppError> {
    users
        .find_by_id(id)
        .await?
        .map(|u| u.profile)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
