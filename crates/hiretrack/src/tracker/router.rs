use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    ApplicationId, ApplicationStatus, JobApplication, NewApplication, NewUser, Page, PageRequest,
    User, UserUpdate, ValidationError,
};
use super::error::TrackerError;
use super::export::{export_csv, export_file_name};
use super::repository::TrackerStore;
use super::service::ApplicationTracker;
use super::users::UserDirectory;
use crate::SharedClock;

/// Services shared by every tracker route.
pub struct TrackerServices<S> {
    pub users: Arc<UserDirectory<S>>,
    pub applications: Arc<ApplicationTracker<S>>,
}

impl<S> TrackerServices<S>
where
    S: TrackerStore + 'static,
{
    pub fn new(store: Arc<S>, clock: SharedClock) -> Self {
        Self {
            users: Arc::new(UserDirectory::new(store.clone(), clock.clone())),
            applications: Arc::new(ApplicationTracker::new(store, clock)),
        }
    }
}

impl<S> Clone for TrackerServices<S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            applications: self.applications.clone(),
        }
    }
}

/// Router builder exposing the user and job application endpoints.
pub fn tracker_router<S>(services: TrackerServices<S>) -> Router
where
    S: TrackerStore + 'static,
{
    Router::new()
        .route(
            "/api/users",
            get(list_users_handler::<S>).post(create_user_handler::<S>),
        )
        .route(
            "/api/users/:email",
            get(get_user_handler::<S>)
                .put(update_user_handler::<S>)
                .delete(delete_user_handler::<S>),
        )
        .route("/api/applications", post(create_application_handler::<S>))
        .route("/api/applications/all", get(list_all_handler::<S>))
        .route(
            "/api/applications/status/:status",
            get(list_by_status_handler::<S>),
        )
        .route(
            "/api/applications/user/:email",
            get(list_by_user_handler::<S>),
        )
        .route(
            "/api/applications/user/:email/status/:status",
            get(list_by_user_and_status_handler::<S>),
        )
        .route(
            "/api/applications/user/:email/export/csv",
            get(export_csv_handler::<S>),
        )
        .route(
            "/api/applications/:id",
            delete(delete_application_handler::<S>),
        )
        .route(
            "/api/applications/:id/status",
            patch(update_status_handler::<S>),
        )
        .with_state(services)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    #[serde(rename = "userEmail")]
    user_email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateQuery {
    status: String,
    #[serde(rename = "userEmail")]
    user_email: String,
}

fn malformed(rejection: impl Display) -> TrackerError {
    ValidationError::Malformed(rejection.to_string()).into()
}

pub(crate) async fn list_users_handler<S>(
    State(services): State<TrackerServices<S>>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<Page<User>>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let Query(page) = page.map_err(malformed)?;
    Ok(Json(services.users.list_users(page)?))
}

pub(crate) async fn get_user_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(email): Path<String>,
) -> Result<Json<User>, TrackerError>
where
    S: TrackerStore + 'static,
{
    Ok(Json(services.users.get_user(&email)?))
}

pub(crate) async fn create_user_handler<S>(
    State(services): State<TrackerServices<S>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), TrackerError>
where
    S: TrackerStore + 'static,
{
    let Json(new_user) = payload.map_err(malformed)?;
    let created = services.users.create_user(new_user)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn update_user_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(email): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let Json(update) = payload.map_err(malformed)?;
    Ok(Json(services.users.update_user(&email, update)?))
}

pub(crate) async fn delete_user_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(email): Path<String>,
) -> Result<StatusCode, TrackerError>
where
    S: TrackerStore + 'static,
{
    services.users.delete_user(&email)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_all_handler<S>(
    State(services): State<TrackerServices<S>>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Result<Json<Page<JobApplication>>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let Query(page) = page.map_err(malformed)?;
    Ok(Json(services.applications.list_all(page)?))
}

pub(crate) async fn list_by_user_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<JobApplication>>, TrackerError>
where
    S: TrackerStore + 'static,
{
    Ok(Json(services.applications.list_by_user(&email)?))
}

pub(crate) async fn list_by_status_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<JobApplication>>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let status: ApplicationStatus = status.parse()?;
    Ok(Json(services.applications.list_by_status(status)?))
}

pub(crate) async fn list_by_user_and_status_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path((email, status)): Path<(String, String)>,
) -> Result<Json<Vec<JobApplication>>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let status: ApplicationStatus = status.parse()?;
    Ok(Json(
        services
            .applications
            .list_by_user_and_status(&email, status)?,
    ))
}

pub(crate) async fn create_application_handler<S>(
    State(services): State<TrackerServices<S>>,
    owner: Result<Query<OwnerQuery>, QueryRejection>,
    payload: Result<Json<NewApplication>, JsonRejection>,
) -> Result<(StatusCode, Json<JobApplication>), TrackerError>
where
    S: TrackerStore + 'static,
{
    let Query(owner) = owner.map_err(malformed)?;
    let Json(application) = payload.map_err(malformed)?;
    let created = services
        .applications
        .create(application, &owner.user_email)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) async fn update_status_handler<S>(
    State(services): State<TrackerServices<S>>,
    id: Result<Path<ApplicationId>, PathRejection>,
    query: Result<Query<StatusUpdateQuery>, QueryRejection>,
) -> Result<Json<JobApplication>, TrackerError>
where
    S: TrackerStore + 'static,
{
    let Path(id) = id.map_err(malformed)?;
    let Query(query) = query.map_err(malformed)?;
    let status: ApplicationStatus = query.status.parse()?;
    let updated = services
        .applications
        .update_status(&id, status, &query.user_email)?;
    Ok(Json(updated))
}

pub(crate) async fn delete_application_handler<S>(
    State(services): State<TrackerServices<S>>,
    id: Result<Path<ApplicationId>, PathRejection>,
    owner: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<StatusCode, TrackerError>
where
    S: TrackerStore + 'static,
{
    let Path(id) = id.map_err(malformed)?;
    let Query(owner) = owner.map_err(malformed)?;
    services.applications.delete(&id, &owner.user_email)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn export_csv_handler<S>(
    State(services): State<TrackerServices<S>>,
    Path(email): Path<String>,
) -> Result<Response, TrackerError>
where
    S: TrackerStore + 'static,
{
    let user = services.users.get_user(&email)?;
    let applications = services.applications.list_by_user(&user.email)?;
    let body = export_csv(&user, &applications)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&user.email)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
