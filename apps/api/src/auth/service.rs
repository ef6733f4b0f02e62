//! Registration and login. Handlers stay thin; the credential rules live here.

use tracing::info;

use crate::auth::jwt::TokenSigner;
use crate::auth::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserProfile};
use crate::store::UserStore;

/// A user together with a freshly issued bearer token.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub async fn register(
    users: &dyn UserStore,
    tokens: &TokenSigner,
    email: String,
    password: String,
    profile: UserProfile,
) -> Result<AuthSession, AppError> {
    // The unique index still catches a racing insert; this check just skips the hash.
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(password).await?;
    let user = users
        .create(NewUser {
            email,
            password_hash,
            profile,
        })
        .await?;
    let token = tokens.issue(user.id)?;

    info!("Registered user {}", user.id);
    Ok(AuthSession { user, token })
}

/// Unknown email and wrong password fail identically.
pub async fn login(
    users: &dyn UserStore,
    tokens: &TokenSigner,
    email: &str,
    password: String,
) -> Result<AuthSession, AppError> {
    let user = users
        .find_by_email(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.issue(user.id)?;
    Ok(AuthSession { user, token })
}
