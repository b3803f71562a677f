use super::common::*;
use crate::tracker::{export_csv, export_file_name, ApplicationStatus};

fn parse(bytes: &[u8]) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers().expect("header row").clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("valid rows");
    (headers, rows)
}

#[test]
fn empty_export_is_just_the_header() {
    let (services, _) = build_services();
    let user = seed_user(&services, "jane@example.com");

    let bytes = export_csv(&user, &[]).expect("export renders");

    assert_eq!(
        String::from_utf8(bytes).expect("utf-8"),
        "ID,Company,Position,Status,Applied Date,Notes,Created At,Updated At\n"
    );
}

#[test]
fn rows_follow_listing_order_and_format_dates() {
    let (services, _) = build_services();
    let user = seed_user(&services, "jane@example.com");
    let older = seed_application(
        &services,
        "jane@example.com",
        "Acme",
        ApplicationStatus::Interview,
        Some((2024, 1, 15)),
    );
    let undated = seed_application(&services, "jane@example.com", "Globex", ApplicationStatus::Applied, None);
    let listed = services
        .applications
        .list_by_user("jane@example.com")
        .expect("listing works");

    let bytes = export_csv(&user, &listed).expect("export renders");
    let (headers, rows) = parse(&bytes);

    assert_eq!(headers.len(), 8);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], older.id.to_string());
    assert_eq!(&rows[0][3], "INTERVIEW");
    assert_eq!(&rows[0][4], "2024-01-15");
    assert_eq!(&rows[0][5], "");
    assert_eq!(
        &rows[0][6],
        older.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    );
    assert_eq!(&rows[1][0], undated.id.to_string());
    assert_eq!(&rows[1][4], "");
}

#[test]
fn special_characters_are_quoted_and_survive_parsing() {
    let (services, _) = build_services();
    let user = seed_user(&services, "jane@example.com");
    let mut payload = new_application(
        "Acme, Inc.",
        "Senior \"Rust\" Engineer",
        ApplicationStatus::Applied,
        None,
    );
    payload.notes = Some("Call back\non Monday".to_string());
    let created = services
        .applications
        .create(payload, "jane@example.com")
        .expect("application created");

    let bytes = export_csv(&user, std::slice::from_ref(&created)).expect("export renders");
    let text = String::from_utf8(bytes.clone()).expect("utf-8");

    assert!(text.contains("\"Acme, Inc.\""));
    assert!(text.contains("\"Senior \"\"Rust\"\" Engineer\""));
    assert!(text.contains("\"Call back\non Monday\""));
    assert!(!text.contains('\r'));

    let (_, rows) = parse(&bytes);
    assert_eq!(&rows[0][1], "Acme, Inc.");
    assert_eq!(&rows[0][2], "Senior \"Rust\" Engineer");
    assert_eq!(&rows[0][5], "Call back\non Monday");
}

#[test]
fn file_name_replaces_at_sign() {
    assert_eq!(
        export_file_name("jane@example.com"),
        "job_applications_jane_example.com.csv"
    );
}
