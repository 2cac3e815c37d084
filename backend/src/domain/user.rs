//! User identity model.
//!
//! The identity record is partitioned by `id`; the email uniqueness
//! invariant is *not* enforced here. It lives in the credentials table and
//! the conditional-write primitive of the table store (see the registration
//! service).

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when constructing user value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email was empty once trimmed.
    EmptyEmail,
    /// Email did not look like `local@domain` or carried stray whitespace.
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => {
                write!(f, "email must be a single local@domain token without whitespace")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not this layer's concern.
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address used as the partition key of the credentials table.
///
/// ## Invariants
/// - Non-empty, exactly one `@`, no whitespace anywhere.
/// - Stored verbatim; no case folding is applied, matching the storage
///   layer's byte-wise partition key comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from borrowed input.
    ///
    /// # Examples
    /// ```
    /// use reelvault_backend::domain::Email;
    ///
    /// let email = Email::new("ada@example.com").expect("valid email");
    /// assert_eq!(email.as_str(), "ada@example.com");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&raw) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(raw))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Draft of a user, as supplied by a caller before registration.
///
/// Server-assignable fields are optional; [`UserDraft::resolve`] fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    /// Identifier, generated when absent.
    pub id: Option<Uuid>,
    /// Given name, stored verbatim.
    pub first_name: String,
    /// Family name, stored verbatim.
    pub last_name: String,
    /// Address the uniqueness invariant is enforced on.
    pub email: Email,
    /// Creation instant, server-assigned when absent.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserDraft {
    /// Build a draft with only the caller-supplied fields set.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Email,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            created_at: None,
        }
    }

    /// Fill server-assigned fields, producing the entity to persist.
    ///
    /// `now` comes from the caller's clock so tests can pin it.
    pub fn resolve(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

/// Registered user identity.
///
/// ## Invariants
/// - `id` is immutable once created.
/// - The row is only ever deleted as a compensating action during a failed
///   registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier, the partition key of the users table.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Address the account was registered under.
    pub email: Email,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}
