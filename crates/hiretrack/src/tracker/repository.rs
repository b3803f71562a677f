use chrono::{DateTime, Utc};

use super::domain::{ApplicationId, ApplicationStatus, JobApplication, Page, PageRequest, User};

/// Criteria for unpaginated application queries. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub owner_email: Option<String>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn owner(email: impl Into<String>) -> Self {
        Self {
            owner_email: Some(email.into()),
            status: None,
        }
    }

    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            owner_email: None,
            status: Some(status),
        }
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, application: &JobApplication) -> bool {
        let owner_matches = self
            .owner_email
            .as_deref()
            .map_or(true, |owner| application.owner_email == owner);
        let status_matches = self
            .status
            .map_or(true, |status| application.status == status);
        owner_matches && status_matches
    }
}

/// Storage port for users. Implementations must make each call atomic.
pub trait UserRepository: Send + Sync {
    /// Users ordered by email.
    fn list_users(&self, page: PageRequest) -> Result<Page<User>, RepositoryError>;
    fn fetch_user(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the email is already taken.
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<User, RepositoryError>;
    /// Removes the user together with every application they own, returning how
    /// many applications went with them.
    fn delete_user(&self, email: &str) -> Result<usize, RepositoryError>;
}

/// Storage port for job applications.
///
/// Every lookup that mutates or deletes takes the owner email alongside the id and
/// treats the pair as a single predicate, so a record owned by somebody else looks
/// exactly like a missing one.
pub trait ApplicationRepository: Send + Sync {
    /// All applications, newest applied date first.
    fn list_applications(
        &self,
        page: PageRequest,
    ) -> Result<Page<JobApplication>, RepositoryError>;
    /// Matching applications, newest applied date first.
    fn find_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
    /// Fails with [`RepositoryError::MissingOwner`] when the owner email does not
    /// resolve to a user; nothing is written in that case.
    fn insert_application(
        &self,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError>;
    fn fetch_owned(
        &self,
        id: &ApplicationId,
        owner_email: &str,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    /// Sets the status and bumps `updated_at`, never moving it backwards. Returns
    /// `None` when no application matches the id and owner pair.
    fn update_status(
        &self,
        id: &ApplicationId,
        owner_email: &str,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<JobApplication>, RepositoryError>;
    /// Returns `false` when no application matches the id and owner pair.
    fn delete_owned(&self, id: &ApplicationId, owner_email: &str)
        -> Result<bool, RepositoryError>;
    /// Distinct owner emails with at least one application in `status`, sorted.
    fn owners_with_status(&self, status: ApplicationStatus)
        -> Result<Vec<String>, RepositoryError>;
}

/// Convenience bound for adapters backing both tables.
pub trait TrackerStore: UserRepository + ApplicationRepository {}

impl<T> TrackerStore for T where T: UserRepository + ApplicationRepository + ?Sized {}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("owner {0} does not exist")]
    MissingOwner(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
