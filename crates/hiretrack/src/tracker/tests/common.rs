use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::tracker::domain::{
    ApplicationId, ApplicationStatus, JobApplication, NewApplication, NewUser, Page, PageRequest,
    User,
};
use crate::tracker::repository::{
    ApplicationFilter, ApplicationRepository, RepositoryError, UserRepository,
};
use crate::tracker::{MemoryStore, TrackerServices};
use crate::SharedClock;

pub(crate) fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that moves forward one second every time it is read.
pub(crate) struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub(crate) fn starting_at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().expect("clock mutex poisoned");
        let current = *now;
        *now = current + chrono::Duration::seconds(1);
        current
    }
}

pub(crate) fn stepping_clock() -> SharedClock {
    Arc::new(SteppingClock::starting_at(fixture_time()))
}

pub(crate) fn build_services() -> (TrackerServices<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let services = TrackerServices::new(store.clone(), stepping_clock());
    (services, store)
}

pub(crate) fn new_user(email: &str, name: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: name.to_string(),
    }
}

pub(crate) fn new_application(
    company: &str,
    position: &str,
    status: ApplicationStatus,
    applied_date: Option<(i32, u32, u32)>,
) -> NewApplication {
    NewApplication {
        company: company.to_string(),
        position: position.to_string(),
        status,
        applied_date: applied_date
            .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
        notes: None,
    }
}

pub(crate) fn seed_user(services: &TrackerServices<MemoryStore>, email: &str) -> User {
    services
        .users
        .create_user(new_user(email, "Seeded User"))
        .expect("seed user")
}

pub(crate) fn seed_application(
    services: &TrackerServices<MemoryStore>,
    owner: &str,
    company: &str,
    status: ApplicationStatus,
    applied_date: Option<(i32, u32, u32)>,
) -> JobApplication {
    services
        .applications
        .create(
            new_application(company, "Engineer", status, applied_date),
            owner,
        )
        .expect("seed application")
}

/// Store whose every call fails as if the database were down.
pub(crate) struct UnavailableStore;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("connection refused".to_string()))
}

impl UserRepository for UnavailableStore {
    fn list_users(&self, _page: PageRequest) -> Result<Page<User>, RepositoryError> {
        unavailable()
    }

    fn fetch_user(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        unavailable()
    }

    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        unavailable()
    }

    fn update_user(&self, _user: User) -> Result<User, RepositoryError> {
        unavailable()
    }

    fn delete_user(&self, _email: &str) -> Result<usize, RepositoryError> {
        unavailable()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn list_applications(
        &self,
        _page: PageRequest,
    ) -> Result<Page<JobApplication>, RepositoryError> {
        unavailable()
    }

    fn find_applications(
        &self,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        unavailable()
    }

    fn insert_application(
        &self,
        _application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        unavailable()
    }

    fn fetch_owned(
        &self,
        _id: &ApplicationId,
        _owner_email: &str,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        unavailable()
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _owner_email: &str,
        _status: ApplicationStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<JobApplication>, RepositoryError> {
        unavailable()
    }

    fn delete_owned(
        &self,
        _id: &ApplicationId,
        _owner_email: &str,
    ) -> Result<bool, RepositoryError> {
        unavailable()
    }

    fn owners_with_status(
        &self,
        _status: ApplicationStatus,
    ) -> Result<Vec<String>, RepositoryError> {
        unavailable()
    }
}

pub(crate) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

pub(crate) fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(crate) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
