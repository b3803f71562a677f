use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::mailer::Mailer;
use super::message::reminder_email;
use crate::tracker::{ApplicationFilter, ApplicationStatus, TrackerStore};

/// Aggregate counts for one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSummary {
    /// Owners found with at least one APPLIED application.
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Outcome of [`ReminderJob::run`]. The job itself never fails outward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderRun {
    Completed(ReminderSummary),
    /// Another pass was already in flight; nothing was read or sent.
    Skipped,
    /// The owner query failed before any user was processed.
    Aborted { reason: String },
}

/// Daily batch reminding users about applications still sitting in APPLIED.
///
/// Read-only against the store. Each user is handled independently: a missing user,
/// a failed lookup or a failed send is logged and counted, and the batch moves on.
pub struct ReminderJob<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    sender: String,
    running: AtomicBool,
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S, M> ReminderJob<S, M>
where
    S: TrackerStore + 'static,
    M: Mailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, sender: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            sender: sender.into(),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one pass unless another is already in progress.
    pub fn run(&self) -> ReminderRun {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("reminder job already running; skipping overlapping invocation");
            return ReminderRun::Skipped;
        };

        info!("starting daily application reminder job");
        let owners = match self.store.owners_with_status(ApplicationStatus::Applied) {
            Ok(owners) => owners,
            Err(err) => {
                error!(error = %err, "reminder job aborted: could not load owners");
                return ReminderRun::Aborted {
                    reason: err.to_string(),
                };
            }
        };

        if owners.is_empty() {
            info!("no users with APPLIED applications; skipping reminders");
            return ReminderRun::Completed(ReminderSummary::default());
        }

        info!(users = owners.len(), "sending application reminders");
        let mut summary = ReminderSummary {
            recipients: owners.len(),
            ..ReminderSummary::default()
        };

        for email in &owners {
            match self.remind(email) {
                Ok(true) => summary.sent += 1,
                Ok(false) => {}
                Err(reason) => {
                    warn!(%email, %reason, "failed to send reminder");
                    summary.failed += 1;
                }
            }
        }

        info!(
            sent = summary.sent,
            failed = summary.failed,
            "daily reminder job completed"
        );
        ReminderRun::Completed(summary)
    }

    /// Returns whether a reminder went out for `email`.
    fn remind(&self, email: &str) -> Result<bool, String> {
        let user = self
            .store
            .fetch_user(email)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("user {email} not found"))?;

        let filter = ApplicationFilter::owner(email).with_status(ApplicationStatus::Applied);
        let applications = self
            .store
            .find_applications(&filter)
            .map_err(|err| err.to_string())?;
        if applications.is_empty() {
            return Ok(false);
        }

        let message = reminder_email(&self.sender, &user, &applications);
        self.mailer.send(&message).map_err(|err| err.to_string())?;
        info!(%email, applications = applications.len(), "reminder email sent");
        Ok(true)
    }
}
