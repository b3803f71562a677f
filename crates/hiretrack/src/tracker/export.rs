//! CSV rendering of a user's applications.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use super::domain::{JobApplication, User};

const HEADER: [&str; 8] = [
    "ID",
    "Company",
    "Position",
    "Status",
    "Applied Date",
    "Notes",
    "Created At",
    "Updated At",
];
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV buffer: {0}")]
    Flush(#[from] std::io::Error),
}

/// Renders `applications` in the order given. Fields holding a comma, a double
/// quote or a line break are quoted with inner quotes doubled; everything else is
/// written bare. Rows end with `\n` and no byte order mark is emitted.
pub fn export_csv(user: &User, applications: &[JobApplication]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for application in applications {
        writer.write_record(row(application))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(std::io::Error::other(err.to_string())))?;

    debug!(owner = %user.email, rows = applications.len(), "rendered CSV export");
    Ok(bytes)
}

/// Attachment name offered to browsers for a user's export.
pub fn export_file_name(email: &str) -> String {
    format!("job_applications_{}.csv", email.replace('@', "_"))
}

fn row(application: &JobApplication) -> [String; 8] {
    [
        application.id.to_string(),
        application.company.clone(),
        application.position.clone(),
        application.status.label().to_string(),
        application
            .applied_date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        application.notes.clone().unwrap_or_default(),
        application.created_at.format(TIMESTAMP_FORMAT).to_string(),
        application.updated_at.format(TIMESTAMP_FORMAT).to_string(),
    ]
}
