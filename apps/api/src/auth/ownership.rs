use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::JobApplication;

/// A record that belongs to exactly one user.
pub trait OwnedResource {
    /// Noun used in not-found messages.
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;
}

impl OwnedResource for JobApplication {
    const KIND: &'static str = "Job application";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// `NotFound` when the lookup came back empty, `Forbidden` when someone else
/// owns the record, otherwise the record itself.
pub fn authorize_owner<T: OwnedResource>(resource: Option<T>, caller: Uuid) -> Result<T, AppError> {
    let resource = resource.ok_or_else(|| AppError::NotFound(format!("{} not found", T::KIND)))?;
    if resource.owner_id() != caller {
        return Err(AppError::Forbidden);
    }
    Ok(resource)
}
