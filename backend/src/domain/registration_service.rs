//! Identity registration coordinator.
//!
//! Creates a user and its credentials record as a single logical operation,
//! enforcing the email uniqueness invariant with a single-partition
//! conditional insert instead of a transaction. Partial failure is handled
//! with compensating deletes; the state machine per attempt is
//! `pending → user-written → credentials-attempted → committed | rolled-back`,
//! expressed as ordinary sequential error handling.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::warn;

use crate::domain::credentials::{Password, UserCredentials};
use crate::domain::store_error_mapping::{map_hash_error, map_store_error};
use crate::domain::tables::{CredentialsRow, RowKey, TableRow, UserRow};
use crate::domain::user::{User, UserDraft};
use crate::domain::Error;
use crate::domain::ports::{CredentialHasher, DeleteGuard, TableStore, WriteMode};

/// Result of a registration attempt.
///
/// An already-taken email is a normal, expected outcome — a constraint
/// rejection, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// Both rows are durably written; the returned user carries the
    /// server-assigned fields, so callers never have to re-read.
    Created(User),
    /// Another account already owns this email. Nothing was left behind.
    EmailTaken,
}

/// Identity registration coordinator.
///
/// Holds no state of its own; safe to invoke from arbitrarily many
/// concurrent callers. Two concurrent registrations for the same email race
/// only at the conditional insert — exactly one observes success, and the
/// loser's compensation is keyed so it can never touch the winner's rows.
#[derive(Clone)]
pub struct RegistrationService<S, H> {
    store: Arc<S>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<S, H> RegistrationService<S, H> {
    /// Create a new coordinator over the given adapters.
    pub fn new(store: Arc<S>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }
}

impl<S, H> RegistrationService<S, H>
where
    S: TableStore,
    H: CredentialHasher,
{
    /// Register a new user, enforcing email uniqueness.
    ///
    /// Fills the draft's server-assigned fields, writes the user row, then
    /// conditionally inserts the credentials row. On a rejected condition the
    /// user row is withdrawn and [`RegistrationOutcome::EmailTaken`] is
    /// returned. On any unexpected failure both rows are deleted best-effort
    /// and the original failure is surfaced; suppressed compensation
    /// failures are recorded on the error's details.
    ///
    /// # Errors
    ///
    /// Returns the mapped store or hasher failure after compensation. The
    /// compensation itself never replaces the original error.
    pub async fn register(
        &self,
        draft: UserDraft,
        password: Password,
    ) -> Result<RegistrationOutcome, Error> {
        let user = draft.resolve(self.clock.utc());
        match self.attempt(&user, &password).await {
            Ok(outcome) => Ok(outcome),
            Err(failure) => Err(self.roll_back(&user, failure).await),
        }
    }

    async fn attempt(
        &self,
        user: &User,
        password: &Password,
    ) -> Result<RegistrationOutcome, Error> {
        // The user row goes in first: without credentials it is a
        // safely-ignorable orphan, whereas credentials referencing a missing
        // user would be an invariant violation on the login path.
        self.store
            .write(&TableRow::User(UserRow::from(user)), WriteMode::Upsert)
            .await
            .map_err(map_store_error)?;

        let password_hash = self.hasher.hash(password).map_err(map_hash_error)?;
        let credentials = UserCredentials {
            email: user.email.clone(),
            password_hash,
            user_id: user.id,
        };
        let applied = self
            .store
            .write(
                &TableRow::Credentials(CredentialsRow::from(&credentials)),
                WriteMode::IfNotExists,
            )
            .await
            .map_err(map_store_error)?;
        if applied {
            return Ok(RegistrationOutcome::Created(user.clone()));
        }

        // Email already taken: withdraw the user row written above.
        self.store
            .delete(&RowKey::User { user_id: user.id }, DeleteGuard::IfExists)
            .await
            .map_err(map_store_error)?;
        Ok(RegistrationOutcome::EmailTaken)
    }

    /// Delete whatever the failed attempt may have written, then hand the
    /// original failure back. Compensation failures are logged and recorded,
    /// never surfaced in place of the original.
    async fn roll_back(&self, user: &User, failure: Error) -> Error {
        let mut suppressed = Vec::new();

        if let Err(err) = self
            .store
            .delete(&RowKey::User { user_id: user.id }, DeleteGuard::IfExists)
            .await
        {
            warn!(user_id = %user.id, error = %err, "registration rollback failed to delete user row");
            suppressed.push(format!("delete users[{}]: {err}", user.id));
        }

        // Guarded on the user back-reference: if the email was taken by
        // someone else, their credentials row stays untouched.
        if let Err(err) = self
            .store
            .delete(
                &RowKey::Credentials {
                    email: user.email.clone(),
                },
                DeleteGuard::IfOwnedBy(user.id),
            )
            .await
        {
            warn!(email = %user.email, error = %err, "registration rollback failed to delete credentials row");
            suppressed.push(format!("delete user_credentials[{}]: {err}", user.email));
        }

        if suppressed.is_empty() {
            failure
        } else {
            failure.with_details(json!({ "suppressedCompensationFailures": suppressed }))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCredentialHasher, MockTableStore, TableStoreError};
    use crate::domain::user::Email;
    use crate::test_support::FixedClock;
    use crate::domain::credentials::PasswordHash;
    use rstest::rstest;
    use uuid::Uuid;

    fn draft(email: &str) -> UserDraft {
        UserDraft::new("Test", "User", Email::new(email).expect("valid test email"))
    }

    fn password() -> Password {
        Password::new("password123").expect("valid test password")
    }

    fn hasher_returning_hash() -> MockCredentialHasher {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().returning(|_| {
            Ok(PasswordHash::new("$2b$12$abcdefghijklmnopqrstuv").expect("valid hash"))
        });
        hasher
    }

    fn service(
        store: MockTableStore,
        hasher: MockCredentialHasher,
    ) -> RegistrationService<MockTableStore, MockCredentialHasher> {
        RegistrationService::new(
            Arc::new(store),
            Arc::new(hasher),
            Arc::new(FixedClock::default()),
        )
    }

    #[tokio::test]
    async fn successful_registration_writes_both_rows() {
        let mut store = MockTableStore::new();
        store
            .expect_write()
            .withf(|row, mode| {
                matches!(row, TableRow::User(_)) && *mode == WriteMode::Upsert
            })
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_write()
            .withf(|row, mode| {
                matches!(row, TableRow::Credentials(_)) && *mode == WriteMode::IfNotExists
            })
            .times(1)
            .returning(|_, _| Ok(true));
        store.expect_delete().times(0);

        let outcome = service(store, hasher_returning_hash())
            .register(draft("ada@example.com"), password())
            .await
            .expect("registration succeeds");

        match outcome {
            RegistrationOutcome::Created(user) => {
                assert_eq!(user.email.as_str(), "ada@example.com");
                assert_eq!(user.created_at, FixedClock::default().now());
                assert!(!user.id.is_nil());
            }
            RegistrationOutcome::EmailTaken => panic!("expected a created user"),
        }
    }

    #[tokio::test]
    async fn taken_email_withdraws_the_user_row() {
        let mut store = MockTableStore::new();
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::User(_)))
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::Credentials(_)))
            .times(1)
            .returning(|_, _| Ok(false));
        store
            .expect_delete()
            .withf(|key, guard| {
                matches!(key, RowKey::User { .. }) && *guard == DeleteGuard::IfExists
            })
            .times(1)
            .returning(|_, _| Ok(true));

        let outcome = service(store, hasher_returning_hash())
            .register(draft("taken@example.com"), password())
            .await
            .expect("rejection is a normal outcome");

        assert_eq!(outcome, RegistrationOutcome::EmailTaken);
    }

    #[tokio::test]
    async fn storage_failure_compensates_both_rows_and_surfaces_the_original_error() {
        let mut store = MockTableStore::new();
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::User(_)))
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::Credentials(_)))
            .times(1)
            .returning(|_, _| Err(TableStoreError::unavailable("node down")));
        store
            .expect_delete()
            .withf(|key, guard| {
                matches!(key, RowKey::User { .. }) && *guard == DeleteGuard::IfExists
            })
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_delete()
            .withf(|key, guard| {
                matches!(key, RowKey::Credentials { .. })
                    && matches!(guard, DeleteGuard::IfOwnedBy(_))
            })
            .times(1)
            .returning(|_, _| Ok(false));

        let err = service(store, hasher_returning_hash())
            .register(draft("ada@example.com"), password())
            .await
            .expect_err("storage failure must surface");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(err.details().is_none(), "clean compensation adds no details");
    }

    #[tokio::test]
    async fn failing_compensation_never_masks_the_original_error() {
        let mut store = MockTableStore::new();
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::User(_)))
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::Credentials(_)))
            .times(1)
            .returning(|_, _| Err(TableStoreError::query("write timeout")));
        store
            .expect_delete()
            .times(2)
            .returning(|_, _| Err(TableStoreError::unavailable("still down")));

        let err = service(store, hasher_returning_hash())
            .register(draft("ada@example.com"), password())
            .await
            .expect_err("storage failure must surface");

        assert_eq!(err.code(), ErrorCode::InternalError);
        let details = err.details().expect("suppressed failures are recorded");
        let suppressed = details
            .get("suppressedCompensationFailures")
            .and_then(|value| value.as_array())
            .expect("details carry the suppressed list");
        assert_eq!(suppressed.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn cleanup_failure_after_rejection_still_surfaces_the_error() {
        // The rejection-path delete itself failing is an unexpected failure:
        // rollback runs and the storage error is surfaced, not EmailTaken.
        let mut store = MockTableStore::new();
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::User(_)))
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_write()
            .withf(|row, _| matches!(row, TableRow::Credentials(_)))
            .times(1)
            .returning(|_, _| Ok(false));
        let mut deletes = 0_u32;
        store.expect_delete().times(3).returning(move |_, _| {
            deletes += 1;
            if deletes == 1 {
                Err(TableStoreError::unavailable("flaky node"))
            } else {
                Ok(false)
            }
        });

        let err = service(store, hasher_returning_hash())
            .register(draft("taken@example.com"), password())
            .await
            .expect_err("cleanup failure surfaces as an error");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
