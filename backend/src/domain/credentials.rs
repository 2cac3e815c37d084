//! Credential primitives: plaintext password material and stored hashes.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a coordinator talks to a port. The
//! plaintext is held in zeroizing storage so it is wiped once the hashing or
//! verification call is done with it.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::Email;

/// Validation errors returned when constructing credential value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Password was blank.
    EmptyPassword,
    /// Stored hash string was blank.
    EmptyHash,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyHash => write!(f, "password hash must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Plaintext password with a scoped lifetime.
///
/// ## Invariants
/// - Required to be non-empty but retains caller-provided whitespace to
///   avoid surprising credential comparisons.
/// - The backing storage is zeroed on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Construct a password from raw input.
    ///
    /// # Examples
    /// ```
    /// use reelvault_backend::domain::Password;
    ///
    /// let password = Password::new("correct horse battery staple").expect("non-empty");
    /// assert_eq!(password.expose().len(), 28);
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Borrow the plaintext for a hashing or verification call.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Opaque password hash in modular-crypt format, as produced by the hasher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string produced by a hasher adapter.
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CredentialValidationError::EmptyHash);
        }
        Ok(Self(raw))
    }

    /// Borrow the hash as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<PasswordHash> for String {
    fn from(value: PasswordHash) -> Self {
        value.0
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = CredentialValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Security record proving ownership of an email address.
///
/// Partitioned by `email` — a different partition key from the user row it
/// references, which is exactly why registration needs compensating actions.
///
/// ## Invariants
/// - At most one row exists per email; existence of the row is authoritative
///   proof the email is taken.
/// - `user_id` is a lookup back-reference, not an ownership relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    /// Partition key of the credentials table.
    pub email: Email,
    /// Hash of the password the account was registered with.
    pub password_hash: PasswordHash,
    /// Back-reference to the owning user row.
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_passwords_are_rejected() {
        let err = Password::new("").expect_err("empty password must fail");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[rstest]
    #[case("  spaced  ")]
    #[case("pw")]
    fn passwords_retain_whitespace(#[case] value: &str) {
        let password = Password::new(value).expect("non-empty password");
        assert_eq!(password.expose(), value);
    }

    #[rstest]
    fn password_debug_never_prints_the_plaintext() {
        let password = Password::new("hunter2").expect("non-empty password");
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    fn blank_hashes_are_rejected(#[case] value: &str) {
        let err = PasswordHash::new(value).expect_err("blank hash must fail");
        assert_eq!(err, CredentialValidationError::EmptyHash);
    }
}
