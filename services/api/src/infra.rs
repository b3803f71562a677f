use chrono::NaiveDate;
use hiretrack::reminders::{EmailMessage, MailError, Mailer};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Development transport: every message is written to the log instead of a relay.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "reminder email dispatched"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
