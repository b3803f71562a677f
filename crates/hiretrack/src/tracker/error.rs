use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::domain::{ApplicationId, ValidationError};
use super::export::ExportError;
use super::repository::RepositoryError;

/// Coarse outcome classes translated to HTTP status codes at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BadRequest,
    Internal,
}

impl ErrorKind {
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error raised by the user directory and application tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("user {0} not found")]
    UserNotFound(String),
    #[error("user {0} already exists")]
    UserExists(String),
    #[error("cannot create application: user {0} does not exist")]
    OwnerNotFound(String),
    /// Raised both for unknown ids and for ids owned by another user.
    #[error("job application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::UserNotFound(_) | TrackerError::ApplicationNotFound(_) => {
                ErrorKind::NotFound
            }
            TrackerError::UserExists(_) => ErrorKind::Conflict,
            TrackerError::OwnerNotFound(_) | TrackerError::Validation(_) => ErrorKind::BadRequest,
            TrackerError::Export(_) => ErrorKind::Internal,
            TrackerError::Repository(err) => match err {
                RepositoryError::Conflict => ErrorKind::Conflict,
                RepositoryError::NotFound => ErrorKind::NotFound,
                RepositoryError::MissingOwner(_) => ErrorKind::BadRequest,
                RepositoryError::Unavailable(_) => ErrorKind::Internal,
            },
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (kind.status_code(), body).into_response()
    }
}
