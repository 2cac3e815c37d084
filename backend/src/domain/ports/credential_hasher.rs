//! Driven port for one-way password hashing.

use thiserror::Error;

use crate::domain::credentials::{Password, PasswordHash};

/// Errors surfaced by hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialHashError {
    /// Hashing failed; typically an out-of-range cost factor.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Adapter-provided description of the failure.
        message: String,
    },
    /// The stored hash could not be parsed during verification. This is a
    /// data problem, never to be reported as a wrong password.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash {
        /// Adapter-provided description of the failure.
        message: String,
    },
}

impl CredentialHashError {
    /// Helper for hashing failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }

    /// Helper for malformed stored hashes.
    pub fn malformed_hash(message: impl Into<String>) -> Self {
        Self::MalformedHash {
            message: message.into(),
        }
    }
}

/// Port for salted, cost-parameterised password hashing.
///
/// Both operations are CPU-bound; the cost factor controls how slow they
/// are. Coordinators call them inline, matching the blocking
/// single-call-sequence model of the whole layer.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash plaintext password material for storage.
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError>;

    /// Verify plaintext against a stored hash.
    fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHashError>;
}
