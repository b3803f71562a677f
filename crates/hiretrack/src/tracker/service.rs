use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use super::domain::{
    ApplicationId, ApplicationStatus, JobApplication, NewApplication, Page, PageRequest,
};
use super::error::TrackerError;
use super::repository::{ApplicationFilter, ApplicationRepository, RepositoryError};
use crate::SharedClock;

/// Service tracking job applications and their owners.
///
/// Mutations take the caller's email next to the application id. The pair is handed
/// to the repository as one predicate, so an application owned by another user is
/// reported exactly like one that does not exist.
pub struct ApplicationTracker<R> {
    repository: Arc<R>,
    clock: SharedClock,
}

impl<R> ApplicationTracker<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: SharedClock) -> Self {
        Self { repository, clock }
    }

    pub fn list_all(&self, page: PageRequest) -> Result<Page<JobApplication>, TrackerError> {
        let page = page.validate()?;
        Ok(self.repository.list_applications(page)?)
    }

    pub fn list_by_user(&self, email: &str) -> Result<Vec<JobApplication>, TrackerError> {
        self.find(ApplicationFilter::owner(email))
    }

    pub fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<JobApplication>, TrackerError> {
        self.find(ApplicationFilter::status(status))
    }

    pub fn list_by_user_and_status(
        &self,
        email: &str,
        status: ApplicationStatus,
    ) -> Result<Vec<JobApplication>, TrackerError> {
        self.find(ApplicationFilter::owner(email).with_status(status))
    }

    /// Record a new application for an existing user.
    pub fn create(
        &self,
        application: NewApplication,
        owner_email: &str,
    ) -> Result<JobApplication, TrackerError> {
        application.validate()?;

        let now = self.clock.utc();
        let record = JobApplication {
            id: ApplicationId::generate(),
            company: application.company,
            position: application.position,
            status: application.status,
            applied_date: application.applied_date,
            notes: application.notes,
            owner_email: owner_email.to_string(),
            created_at: now,
            updated_at: now,
        };

        match self.repository.insert_application(record) {
            Ok(stored) => {
                info!(id = %stored.id, owner = %stored.owner_email, "job application created");
                Ok(stored)
            }
            Err(RepositoryError::MissingOwner(owner)) => Err(TrackerError::OwnerNotFound(owner)),
            Err(other) => Err(other.into()),
        }
    }

    pub fn find_owned(
        &self,
        id: &ApplicationId,
        caller_email: &str,
    ) -> Result<JobApplication, TrackerError> {
        self.repository
            .fetch_owned(id, caller_email)?
            .ok_or(TrackerError::ApplicationNotFound(*id))
    }

    pub fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        caller_email: &str,
    ) -> Result<JobApplication, TrackerError> {
        let now = self.clock.utc();
        let updated = self
            .repository
            .update_status(id, caller_email, status, now)?
            .ok_or(TrackerError::ApplicationNotFound(*id))?;

        debug!(%id, %status, "job application status updated");
        Ok(updated)
    }

    pub fn delete(&self, id: &ApplicationId, caller_email: &str) -> Result<(), TrackerError> {
        if !self.repository.delete_owned(id, caller_email)? {
            return Err(TrackerError::ApplicationNotFound(*id));
        }

        info!(%id, "job application deleted");
        Ok(())
    }

    fn find(&self, filter: ApplicationFilter) -> Result<Vec<JobApplication>, TrackerError> {
        Ok(self.repository.find_applications(&filter)?)
    }
}
