use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone};
use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::job::{ReminderJob, ReminderRun};
use super::mailer::Mailer;
use crate::tracker::TrackerStore;
use crate::SharedClock;

/// Fires once a day at a fixed wall-clock time in the clock's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// First firing strictly after `now`. A time swallowed by a DST gap moves one
    /// hour later.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let zone = now.timezone();
        let mut day = now.date_naive();

        for _ in 0..3 {
            let naive = day.and_time(self.at);
            let candidate = zone
                .from_local_datetime(&naive)
                .earliest()
                .or_else(|| {
                    zone.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                        .earliest()
                });

            if let Some(candidate) = candidate {
                if candidate > *now {
                    return Some(candidate);
                }
            }
            day = day.succ_opt()?;
        }

        None
    }

    /// How long to sleep from `now` until the next firing.
    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Duration> {
        let next = self.next_after(now)?;
        Some(
            next.signed_duration_since(now.clone())
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }
}

/// Spawn the recurring reminder task. Each firing runs the job on the blocking pool
/// so slow mail transports never stall the async runtime.
pub fn spawn_daily<S, M>(
    job: Arc<ReminderJob<S, M>>,
    schedule: DailySchedule,
    clock: SharedClock,
) -> JoinHandle<()>
where
    S: TrackerStore + 'static,
    M: Mailer + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = clock.local();
            let Some(delay) = schedule.delay_from(&now) else {
                error!("could not compute the next reminder firing; stopping scheduler");
                return;
            };
            info!(at = %schedule.at(), wait_secs = delay.as_secs(), "next reminder run scheduled");
            tokio::time::sleep(delay).await;

            let job = job.clone();
            match tokio::task::spawn_blocking(move || job.run()).await {
                Ok(ReminderRun::Completed(summary)) => {
                    info!(
                        recipients = summary.recipients,
                        sent = summary.sent,
                        failed = summary.failed,
                        "scheduled reminder run finished"
                    );
                }
                Ok(ReminderRun::Skipped) => warn!("scheduled reminder run skipped"),
                Ok(ReminderRun::Aborted { reason }) => {
                    error!(%reason, "scheduled reminder run aborted");
                }
                Err(err) => error!(error = %err, "reminder task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).expect("valid time")
    }

    #[test]
    fn fires_later_today_when_time_is_ahead() {
        let schedule = DailySchedule::new(nine());
        let now = Utc
            .with_ymd_and_hms(2024, 3, 10, 7, 30, 0)
            .single()
            .expect("valid");
        let next = schedule.next_after(&now).expect("next firing");
        assert_eq!(
            next,
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).single().expect("valid")
        );
        assert_eq!(
            schedule.delay_from(&now),
            Some(Duration::from_secs(90 * 60))
        );
    }

    #[test]
    fn fires_tomorrow_once_time_has_passed() {
        let schedule = DailySchedule::new(nine());
        let exactly_nine = Utc
            .with_ymd_and_hms(2024, 3, 10, 9, 0, 0)
            .single()
            .expect("valid");
        let next = schedule.next_after(&exactly_nine).expect("next firing");
        assert_eq!(
            next,
            Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).single().expect("valid")
        );
    }

    #[test]
    fn respects_the_clock_offset() {
        let schedule = DailySchedule::new(nine());
        let zone = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        let now = zone
            .with_ymd_and_hms(2024, 12, 31, 23, 15, 0)
            .single()
            .expect("valid");
        let next = schedule.next_after(&now).expect("next firing");
        assert_eq!(
            next,
            zone.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).single().expect("valid")
        );
        assert_eq!(next.naive_local().time(), nine());
    }
}
