use anyhow::Context;

use crate::errors::AppError;

/// bcrypt work factor for new hashes.
pub const BCRYPT_COST: u32 = 10;

/// Hashes a password off the async executor.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")?;
    Ok(hashed)
}

/// Checks a password against a stored hash. A malformed hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .context("password verification task failed")?;
    Ok(matches)
}
