//! Users, their job applications, and the HTTP surface over both.
//!
//! Users are keyed by email. Applications carry their owner's email and every
//! mutating call repeats it, which is the only ownership check the service makes.

pub mod domain;
pub mod error;
pub mod export;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod users;

#[cfg(test)]
pub(crate) mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, JobApplication, NewApplication, NewUser, Page, PageRequest,
    User, UserUpdate, ValidationError,
};
pub use error::{ErrorKind, TrackerError};
pub use export::{export_csv, export_file_name, ExportError};
pub use repository::{
    ApplicationFilter, ApplicationRepository, RepositoryError, TrackerStore, UserRepository,
};
pub use router::{tracker_router, TrackerServices};
pub use service::ApplicationTracker;
pub use store::MemoryStore;
pub use users::UserDirectory;
