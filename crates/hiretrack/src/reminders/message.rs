use std::fmt::Write as _;

use super::mailer::EmailMessage;
use crate::tracker::{JobApplication, User};

pub const REMINDER_SUBJECT: &str = "Reminder: You have pending job applications";

/// Build the reminder sent to `user` about their still-APPLIED applications.
pub fn reminder_email(
    sender: &str,
    user: &User,
    applications: &[JobApplication],
) -> EmailMessage {
    EmailMessage {
        from: sender.to_string(),
        to: user.email.clone(),
        subject: REMINDER_SUBJECT.to_string(),
        body: reminder_body(&user.name, applications),
    }
}

pub fn reminder_body(name: &str, applications: &[JobApplication]) -> String {
    let mut body = String::new();
    let _ = write!(body, "Hello {name},\n\n");
    let _ = write!(
        body,
        "This is a friendly reminder that you have {} job application(s) with status 'APPLIED' that may need your attention:\n\n",
        applications.len()
    );

    for (index, application) in applications.iter().enumerate() {
        let _ = write!(
            body,
            "{}. {} at {}",
            index + 1,
            application.position,
            application.company
        );
        if let Some(date) = application.applied_date {
            let _ = write!(body, " (Applied on: {})", date.format("%Y-%m-%d"));
        }
        if let Some(notes) = application.notes.as_deref().filter(|notes| !notes.is_empty()) {
            let _ = write!(body, "\n   Notes: {notes}");
        }
        body.push_str("\n\n");
    }

    body.push_str("Don't forget to follow up on these applications!\n\n");
    body.push_str("Best regards,\n");
    body.push_str("HireTrack Team");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ApplicationId, ApplicationStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn application(
        position: &str,
        company: &str,
        applied: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> JobApplication {
        let created = Utc
            .with_ymd_and_hms(2024, 1, 20, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        JobApplication {
            id: ApplicationId::generate(),
            company: company.to_string(),
            position: position.to_string(),
            status: ApplicationStatus::Applied,
            applied_date: applied,
            notes: notes.map(str::to_string),
            owner_email: "jane@example.com".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn body_lists_each_application_with_optional_details() {
        let applications = vec![
            application(
                "Backend Engineer",
                "Acme",
                NaiveDate::from_ymd_opt(2024, 1, 15),
                Some("Referred by Sam"),
            ),
            application("Data Analyst", "Globex", None, Some("")),
        ];

        let body = reminder_body("Jane", &applications);

        let expected = "Hello Jane,\n\n\
This is a friendly reminder that you have 2 job application(s) with status 'APPLIED' that may need your attention:\n\n\
1. Backend Engineer at Acme (Applied on: 2024-01-15)\n   Notes: Referred by Sam\n\n\
2. Data Analyst at Globex\n\n\
Don't forget to follow up on these applications!\n\n\
Best regards,\n\
HireTrack Team";
        assert_eq!(body, expected);
    }

    #[test]
    fn email_addresses_the_owner_with_fixed_subject() {
        let created = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let user = User {
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            created_at: created,
            updated_at: created,
        };
        let applications = vec![application("Engineer", "Initech", None, None)];

        let email = reminder_email("noreply@hiretrack.local", &user, &applications);

        assert_eq!(email.to, "jane@example.com");
        assert_eq!(email.from, "noreply@hiretrack.local");
        assert_eq!(email.subject, REMINDER_SUBJECT);
        assert!(email.body.contains("1. Engineer at Initech\n\n"));
        assert!(email.body.contains("you have 1 job application(s)"));
    }
}
