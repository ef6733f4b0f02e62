//! In-process stores with the same contracts as the Postgres ones. Test-only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationStatus, JobApplication, NewJobApplication};
use crate::models::user::{NewUser, ProfileUpdate, Skill, User};
use crate::store::{ApplicationStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            profile: user.profile,
            created_at: now,
            updated_at: now,
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.profile.apply_update(update);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upsert_skill(&self, id: Uuid, skill: Skill) -> Result<Option<Vec<Skill>>, AppError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.profile.upsert_skill(skill);
            user.updated_at = Utc::now();
            user.profile.skills.clone()
        }))
    }

    async fn remove_skill(&self, id: Uuid, name: &str) -> Result<Option<Vec<Skill>>, AppError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.profile.remove_skill(name);
            user.updated_at = Utc::now();
            user.profile.skills.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryApplicationStore {
    applications: RwLock<Vec<JobApplication>>,
}

impl MemoryApplicationStore {
    pub async fn count(&self) -> usize {
        self.applications.read().await.len()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn create(&self, application: NewJobApplication) -> Result<JobApplication, AppError> {
        let mut applications = self.applications.write().await;

        // Keep creation order observable even when inserts land in the same tick.
        let mut created_at = Utc::now();
        if let Some(last) = applications.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + Duration::microseconds(1);
            }
        }

        let stored = JobApplication {
            id: Uuid::new_v4(),
            user_id: application.user_id,
            job_description: application.job_description,
            job_title: application.job_title,
            company_name: application.company_name,
            match_score: application.match_score,
            analysis: application.analysis,
            learning_plan: application.learning_plan,
            status: ApplicationStatus::default(),
            created_at,
            updated_at: created_at,
        };
        applications.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<JobApplication>, AppError> {
        let applications = self.applications.read().await;
        let mut owned: Vec<JobApplication> = applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobApplication>, AppError> {
        let applications = self.applications.read().await;
        Ok(applications.iter().find(|a| a.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<JobApplication>, AppError> {
        let mut applications = self.applications.write().await;
        Ok(applications.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.updated_at = Utc::now();
            a.clone()
        }))
    }
}
