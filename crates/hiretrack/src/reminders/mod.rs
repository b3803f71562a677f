//! Daily reminder emails for applications still waiting in APPLIED.

mod job;
pub mod mailer;
pub mod message;
mod schedule;


pub use job::{ReminderJob, ReminderRun, ReminderSummary};
pub use mailer::{EmailMessage, MailError, Mailer};
pub use message::{reminder_body, reminder_email, REMINDER_SUBJECT};
pub use schedule::{spawn_daily, DailySchedule};
