//! Shared mapping from port errors into the domain error type.
//!
//! Every coordinator maps the same way: transient store outages stay
//! retryable for the caller, everything else is internal. Kept in one place
//! so the services cannot drift apart.

use crate::domain::Error;
use crate::domain::ports::{CredentialHashError, TableStoreError};

/// Map a table store failure into a domain error.
pub(crate) fn map_store_error(error: TableStoreError) -> Error {
    match error {
        TableStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("table store unavailable: {message}"))
        }
        TableStoreError::Query { message } => {
            Error::internal(format!("table store query failed: {message}"))
        }
    }
}

/// Map a hasher failure into a domain error.
pub(crate) fn map_hash_error(error: CredentialHashError) -> Error {
    match error {
        CredentialHashError::Hash { message } => {
            Error::internal(format!("password hashing failed: {message}"))
        }
        CredentialHashError::MalformedHash { message } => {
            Error::internal(format!("stored password hash is malformed: {message}"))
        }
    }
}
