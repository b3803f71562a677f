use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    applied_date_desc, ApplicationId, ApplicationStatus, JobApplication, Page, PageRequest, User,
};
use super::repository::{
    ApplicationFilter, ApplicationRepository, RepositoryError, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, User>,
    applications: HashMap<ApplicationId, JobApplication>,
}

impl Tables {
    fn sorted_applications(&self, filter: &ApplicationFilter) -> Vec<JobApplication> {
        let mut matching: Vec<JobApplication> = self
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect();
        matching.sort_by(applied_date_desc);
        matching
    }
}

/// In-process store backing both tables behind one lock, so every call is a single
/// atomic unit: the owner check on insert, the cascade on user deletion and the
/// compound id/owner predicates never observe a half-applied write.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl UserRepository for MemoryStore {
    fn list_users(&self, page: PageRequest) -> Result<Page<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(Page::paginate(tables.users.values().cloned(), page))
    }

    fn fetch_user(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.users.get(email).cloned())
    }

    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.users.contains_key(&user.email) {
            return Err(RepositoryError::Conflict);
        }
        tables.users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        let existing = tables
            .users
            .get_mut(&user.email)
            .ok_or(RepositoryError::NotFound)?;
        *existing = user.clone();
        Ok(user)
    }

    fn delete_user(&self, email: &str) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.users.remove(email).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let before = tables.applications.len();
        tables
            .applications
            .retain(|_, application| application.owner_email != email);
        Ok(before - tables.applications.len())
    }
}

impl ApplicationRepository for MemoryStore {
    fn list_applications(
        &self,
        page: PageRequest,
    ) -> Result<Page<JobApplication>, RepositoryError> {
        let tables = self.tables()?;
        let all = ApplicationFilter::default();
        let ordered = tables.sorted_applications(&all);
        Ok(Page::paginate(ordered.into_iter(), page))
    }

    fn find_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.sorted_applications(filter))
    }

    fn insert_application(
        &self,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&application.owner_email) {
            return Err(RepositoryError::MissingOwner(application.owner_email));
        }
        if tables.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn fetch_owned(
        &self,
        id: &ApplicationId,
        owner_email: &str,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .get(id)
            .filter(|application| application.owner_email == owner_email)
            .cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        owner_email: &str,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        let mut tables = self.tables()?;
        match tables.applications.get_mut(id) {
            Some(application) if application.owner_email == owner_email => {
                application.status = status;
                application.updated_at = application.updated_at.max(updated_at);
                Ok(Some(application.clone()))
            }
            _ => Ok(None),
        }
    }

    fn delete_owned(
        &self,
        id: &ApplicationId,
        owner_email: &str,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        let owned = tables
            .applications
            .get(id)
            .is_some_and(|application| application.owner_email == owner_email);
        if owned {
            tables.applications.remove(id);
        }
        Ok(owned)
    }

    fn owners_with_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<String>, RepositoryError> {
        let tables = self.tables()?;
        let owners: BTreeSet<&String> = tables
            .applications
            .values()
            .filter(|application| application.status == status)
            .map(|application| &application.owner_email)
            .collect();
        Ok(owners.into_iter().cloned().collect())
    }
}
