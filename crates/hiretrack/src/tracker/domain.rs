use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Maximum number of characters accepted in application notes.
pub const MAX_NOTES_LENGTH: usize = 2000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Identifier wrapper for job applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ApplicationId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}

/// Where an application currently stands. Transitions are unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Rejected,
    Offered,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [Self; 5] = [
        Self::Applied,
        Self::Interview,
        Self::Rejected,
        Self::Offered,
        Self::Hired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Offered => "OFFERED",
            ApplicationStatus::Hired => "HIRED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts any casing of the five status names.
impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| ValidationError::UnknownStatus(raw.to_string()))
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rejected input, surfaced to callers as a bad request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "unknown application status '{0}'; expected one of APPLIED, INTERVIEW, REJECTED, OFFERED, HIRED"
    )]
    UnknownStatus(String),
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("notes must be at most {max} characters (got {actual})")]
    NotesTooLong { max: usize, actual: usize },
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("page size must be between 1 and {max} (got {actual})")]
    PageSize { max: u32, actual: u32 },
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// A registered user. The email is the natural key and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted when registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        require("name", &self.name)
    }
}

/// Mutable user fields. Any other fields present in the request body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

/// A job application owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: ApplicationId,
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub applied_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client supplied application fields; identifiers and timestamps are always system assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewApplication {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("company", &self.company)?;
        require("position", &self.position)?;

        if let Some(notes) = &self.notes {
            let actual = notes.chars().count();
            if actual > MAX_NOTES_LENGTH {
                return Err(ValidationError::NotesTooLong {
                    max: MAX_NOTES_LENGTH,
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// Newest applied date first, undated applications last. Ties fall back to creation
/// time (newest first) and then the identifier so listings are deterministic.
pub fn applied_date_desc(left: &JobApplication, right: &JobApplication) -> Ordering {
    right
        .applied_date
        .cmp(&left.applied_date)
        .then_with(|| right.created_at.cmp(&left.created_at))
        .then_with(|| left.id.cmp(&right.id))
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    require("email", email)?;

    let invalid_char = email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '"');
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };

    if invalid_char || !well_formed {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Zero-based page selection for paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, ValidationError> {
        Self { page, size }.validate()
    }

    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(ValidationError::PageSize {
                max: MAX_PAGE_SIZE,
                actual: self.size,
            });
        }
        Ok(self)
    }

    fn offset(self) -> usize {
        (self.page as usize).saturating_mul(self.size as usize)
    }
}

/// One page of an ordered listing plus the totals needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cuts the requested window out of an already ordered sequence.
    pub fn paginate<I>(items: I, request: PageRequest) -> Self
    where
        I: ExactSizeIterator<Item = T>,
    {
        let total = items.len();
        let size = request.size.max(1);
        let content = items.skip(request.offset()).take(size as usize).collect();
        let total_pages = total.div_ceil(size as usize);

        Self {
            content,
            page: request.page,
            size,
            total_elements: total as u64,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}
