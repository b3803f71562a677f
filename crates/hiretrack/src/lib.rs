//! HireTrack: users, their job applications, CSV export and a daily reminder job.
//!
//! The [`tracker`] module owns the data model, the storage seam and the HTTP
//! routes; [`reminders`] reads the same store once a day and mails owners of
//! applications still waiting in `APPLIED`.

pub mod config;
pub mod error;
pub mod reminders;
pub mod telemetry;
pub mod tracker;

use std::sync::Arc;

/// Time source shared by services that stamp records or schedule work.
pub type SharedClock = Arc<dyn mockable::Clock + Send + Sync>;

pub use error::AppError;
