use chrono::{Local, NaiveDate};
use clap::Args;
use hiretrack::reminders::{EmailMessage, MailError, Mailer, ReminderJob, ReminderRun};
use hiretrack::tracker::{
    export_csv, export_file_name, ApplicationStatus, JobApplication, MemoryStore, NewApplication,
    NewUser, PageRequest, TrackerError, TrackerServices,
};
use hiretrack::AppError;
use mockable::DefaultClock;
use std::sync::Arc;

const DEMO_SENDER: &str = "noreply@hiretrack.local";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Anchor the sample applied dates to this day (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Run the reminder job once and print every email it would send.
    #[arg(long)]
    pub(crate) remind: bool,
}

/// Prints reminders to stdout so the demo output shows the full message.
struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        println!("\n--- email ---");
        println!("From: {}", message.from);
        println!("To: {}", message.to);
        println!("Subject: {}", message.subject);
        println!();
        println!("{}", message.body);
        println!("-------------");
        Ok(())
    }
}

struct SampleApplication {
    owner: &'static str,
    company: &'static str,
    position: &'static str,
    status: ApplicationStatus,
    days_ago: Option<i64>,
    notes: Option<&'static str>,
}

const SAMPLE_USERS: [(&str, &str); 2] = [
    ("jane.doe@example.com", "Jane Doe"),
    ("sam.lee@example.com", "Sam Lee"),
];

const SAMPLE_APPLICATIONS: [SampleApplication; 5] = [
    SampleApplication {
        owner: "jane.doe@example.com",
        company: "Acme, Inc.",
        position: "Backend Engineer",
        status: ApplicationStatus::Applied,
        days_ago: Some(5),
        notes: Some("Referred by a former teammate"),
    },
    SampleApplication {
        owner: "jane.doe@example.com",
        company: "Globex",
        position: "Platform Engineer",
        status: ApplicationStatus::Interview,
        days_ago: Some(12),
        notes: Some("Onsite loop scheduled, bring \"system design\" notes"),
    },
    SampleApplication {
        owner: "jane.doe@example.com",
        company: "Initech",
        position: "Site Reliability Engineer",
        status: ApplicationStatus::Applied,
        days_ago: None,
        notes: None,
    },
    SampleApplication {
        owner: "sam.lee@example.com",
        company: "Umbrella",
        position: "Data Analyst",
        status: ApplicationStatus::Applied,
        days_ago: Some(2),
        notes: None,
    },
    SampleApplication {
        owner: "sam.lee@example.com",
        company: "Hooli",
        position: "Product Analyst",
        status: ApplicationStatus::Rejected,
        days_ago: Some(30),
        notes: Some("Position filled internally"),
    },
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, remind } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(MemoryStore::new());
    let services = TrackerServices::new(store.clone(), Arc::new(DefaultClock));
    seed(&services, today)?;

    println!("HireTrack demo (applied dates relative to {today})");

    let users = services.users.list_users(PageRequest::default())?;
    println!("\nUsers ({} total)", users.total_elements);
    for user in &users.content {
        let applications = services.applications.list_by_user(&user.email)?;
        println!("- {} <{}>: {} application(s)", user.name, user.email, applications.len());
        for application in &applications {
            println!("    {}", describe(application));
        }
    }

    println!("\nApplications by status");
    for status in ApplicationStatus::ALL {
        let count = services.applications.list_by_status(status)?.len();
        println!("- {status}: {count}");
    }

    let jane = services.users.get_user(SAMPLE_USERS[0].0)?;
    let janes_applications = services.applications.list_by_user(&jane.email)?;
    if let Some(first) = janes_applications.first() {
        let updated = services.applications.update_status(
            &first.id,
            ApplicationStatus::Interview,
            &jane.email,
        )?;
        println!(
            "\nMoved {} at {} to {}",
            updated.position, updated.company, updated.status
        );
    }

    let applications = services.applications.list_by_user(&jane.email)?;
    let csv = export_csv(&jane, &applications).map_err(TrackerError::from)?;
    println!("\nCSV export ({})", export_file_name(&jane.email));
    print!("{}", String::from_utf8_lossy(&csv));

    if remind {
        println!("\nRunning the daily reminder job once");
        let job = ReminderJob::new(store, Arc::new(ConsoleMailer), DEMO_SENDER);
        match job.run() {
            ReminderRun::Completed(summary) => println!(
                "\nReminders: {} recipient(s), {} sent, {} failed",
                summary.recipients, summary.sent, summary.failed
            ),
            ReminderRun::Skipped => println!("\nReminder job already running; skipped"),
            ReminderRun::Aborted { reason } => println!("\nReminder job aborted: {reason}"),
        }
    }

    let sam = SAMPLE_USERS[1].0;
    let sams_applications = services.applications.list_by_user(sam)?;
    services.users.delete_user(sam)?;
    let gone = sams_applications
        .iter()
        .filter(|application| services.applications.find_owned(&application.id, sam).is_err())
        .count();
    let remaining = services.applications.list_all(PageRequest::default())?;
    println!(
        "\nDeleted {sam}: {gone} of their application(s) went with them, {} remain overall",
        remaining.total_elements
    );

    Ok(())
}

fn seed(services: &TrackerServices<MemoryStore>, today: NaiveDate) -> Result<(), AppError> {
    for (email, name) in SAMPLE_USERS {
        services.users.create_user(NewUser {
            email: email.to_string(),
            name: name.to_string(),
        })?;
    }

    for sample in &SAMPLE_APPLICATIONS {
        let applied_date = sample
            .days_ago
            .map(|days| today - chrono::Duration::days(days));
        services.applications.create(
            NewApplication {
                company: sample.company.to_string(),
                position: sample.position.to_string(),
                status: sample.status,
                applied_date,
                notes: sample.notes.map(str::to_string),
            },
            sample.owner,
        )?;
    }

    Ok(())
}

fn describe(application: &JobApplication) -> String {
    let applied = application
        .applied_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string());
    format!(
        "[{}] {} at {} ({applied})",
        application.status, application.position, application.company
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_end_to_end() {
        let args = DemoArgs {
            today: NaiveDate::from_ymd_opt(2024, 6, 3),
            remind: true,
        };
        run_demo(args).expect("demo completes");
    }

    #[test]
    fn seed_populates_both_users() {
        let services = TrackerServices::new(Arc::new(MemoryStore::new()), Arc::new(DefaultClock));
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date");

        seed(&services, today).expect("seed succeeds");

        let janes = services
            .applications
            .list_by_user("jane.doe@example.com")
            .expect("listing");
        assert_eq!(janes.len(), 3);
        assert_eq!(
            janes[0].applied_date,
            NaiveDate::from_ymd_opt(2024, 5, 29)
        );
        assert!(janes[2].applied_date.is_none());
        let applied = services
            .applications
            .list_by_status(ApplicationStatus::Applied)
            .expect("listing");
        assert_eq!(applied.len(), 3);
    }

    #[test]
    fn describe_marks_undated_applications() {
        let services = TrackerServices::new(Arc::new(MemoryStore::new()), Arc::new(DefaultClock));
        seed(&services, NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date"))
            .expect("seed succeeds");
        let janes = services
            .applications
            .list_by_user("jane.doe@example.com")
            .expect("listing");

        assert_eq!(
            describe(&janes[2]),
            "[APPLIED] Site Reliability Engineer at Initech (undated)"
        );
    }
}
