use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::domain::{NewUser, Page, PageRequest, User, UserUpdate};
use super::error::TrackerError;
use super::repository::{RepositoryError, UserRepository};
use crate::SharedClock;

/// CRUD over users keyed by email.
pub struct UserDirectory<R> {
    repository: Arc<R>,
    clock: SharedClock,
}

impl<R> UserDirectory<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: SharedClock) -> Self {
        Self { repository, clock }
    }

    pub fn list_users(&self, page: PageRequest) -> Result<Page<User>, TrackerError> {
        let page = page.validate()?;
        Ok(self.repository.list_users(page)?)
    }

    pub fn get_user(&self, email: &str) -> Result<User, TrackerError> {
        self.repository
            .fetch_user(email)?
            .ok_or_else(|| TrackerError::UserNotFound(email.to_string()))
    }

    /// Register a new user; an existing email is left untouched and reported as a conflict.
    pub fn create_user(&self, new_user: NewUser) -> Result<User, TrackerError> {
        new_user.validate()?;

        let now = self.clock.utc();
        let user = User {
            email: new_user.email,
            name: new_user.name,
            created_at: now,
            updated_at: now,
        };
        let email = user.email.clone();

        match self.repository.insert_user(user) {
            Ok(stored) => {
                info!(email = %stored.email, "user created");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => Err(TrackerError::UserExists(email)),
            Err(other) => Err(other.into()),
        }
    }

    /// Rename a user. Email and creation time never change.
    pub fn update_user(&self, email: &str, update: UserUpdate) -> Result<User, TrackerError> {
        update.validate()?;

        let mut user = self.get_user(email)?;
        user.name = update.name;
        user.updated_at = self.clock.utc().max(user.created_at);

        match self.repository.update_user(user) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::NotFound) => Err(TrackerError::UserNotFound(email.to_string())),
            Err(other) => Err(other.into()),
        }
    }

    /// Delete a user and, with it, every application they own.
    pub fn delete_user(&self, email: &str) -> Result<(), TrackerError> {
        match self.repository.delete_user(email) {
            Ok(removed_applications) => {
                info!(%email, removed_applications, "user deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(TrackerError::UserNotFound(email.to_string())),
            Err(other) => Err(other.into()),
        }
    }
}
