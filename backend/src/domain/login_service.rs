//! Credential verification coordinator.
//!
//! Authenticates an email/password pair against the stored credentials row
//! and resolves the owning user. An unknown email and a wrong password are
//! deliberately indistinguishable in the return shape, so the login path
//! cannot be used to enumerate registered addresses.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::credentials::{Password, UserCredentials};
use crate::domain::store_error_mapping::{map_hash_error, map_store_error};
use crate::domain::tables::{RowKey, TableRow};
use crate::domain::user::{Email, User};
use crate::domain::Error;
use crate::domain::ports::{CredentialHasher, TableStore};

/// Credential verification coordinator.
#[derive(Clone)]
pub struct LoginService<S, H> {
    store: Arc<S>,
    hasher: Arc<H>,
}

impl<S, H> LoginService<S, H> {
    /// Create a new coordinator over the given adapters.
    pub fn new(store: Arc<S>, hasher: Arc<H>) -> Self {
        Self { store, hasher }
    }
}

impl<S, H> LoginService<S, H>
where
    S: TableStore,
    H: CredentialHasher,
{
    /// Authenticate and return the full user on success.
    ///
    /// Returns `Ok(None)` for an unknown email or a wrong password — both
    /// observably identical. A credentials row whose user is missing is an
    /// invariant violation (the registration ordering makes that state
    /// unreachable) and surfaces as an internal error, never as a failed
    /// login.
    ///
    /// # Errors
    ///
    /// Mapped store and hasher failures, and the invariant violation above.
    pub async fn login(&self, email: &Email, password: &Password) -> Result<Option<User>, Error> {
        let Some(credentials) = self.read_credentials(email).await? else {
            return Ok(None);
        };

        let verified = self
            .hasher
            .verify(password, &credentials.password_hash)
            .map_err(map_hash_error)?;
        if !verified {
            return Ok(None);
        }

        let user = self.read_user(credentials.user_id).await?.ok_or_else(|| {
            Error::internal(format!(
                "credentials for {email} reference missing user {}",
                credentials.user_id
            ))
        })?;
        Ok(Some(user))
    }

    /// Resolve a user through the credentials back-reference.
    ///
    /// Unlike [`LoginService::login`] this performs no password check; it is
    /// the lookup used when a caller already holds an authenticated email.
    ///
    /// # Errors
    ///
    /// Mapped store failures and corrupt rows.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, Error> {
        let Some(credentials) = self.read_credentials(email).await? else {
            return Ok(None);
        };
        self.read_user(credentials.user_id).await
    }

    async fn read_credentials(&self, email: &Email) -> Result<Option<UserCredentials>, Error> {
        let key = RowKey::Credentials {
            email: email.clone(),
        };
        let Some(row) = self.store.read(&key).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        let TableRow::Credentials(row) = row else {
            return Err(Error::internal(format!(
                "credentials read returned a {} row",
                row.table()
            )));
        };
        UserCredentials::try_from(row)
            .map(Some)
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn read_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let Some(row) = self
            .store
            .read(&RowKey::User { user_id })
            .await
            .map_err(map_store_error)?
        else {
            return Ok(None);
        };
        let TableRow::User(row) = row else {
            return Err(Error::internal(format!(
                "user read returned a {} row",
                row.table()
            )));
        };
        User::try_from(row)
            .map(Some)
            .map_err(|err| Error::internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::credentials::PasswordHash;
    use crate::domain::ports::{MockCredentialHasher, MockTableStore};
    use crate::domain::tables::{CredentialsRow, UserRow};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn email(value: &str) -> Email {
        Email::new(value).expect("valid test email")
    }

    fn password() -> Password {
        Password::new("password123").expect("valid test password")
    }

    fn stored_hash() -> PasswordHash {
        PasswordHash::new("$2b$12$abcdefghijklmnopqrstuv").expect("valid hash")
    }

    fn stored_user(user_id: Uuid, address: &str) -> User {
        User {
            id: user_id,
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: email(address),
            created_at: Utc
                .with_ymd_and_hms(2026, 8, 7, 9, 0, 0)
                .single()
                .expect("valid instant"),
        }
    }

    fn store_with_credentials(user_id: Uuid, address: &str) -> MockTableStore {
        let credentials = UserCredentials {
            email: email(address),
            password_hash: stored_hash(),
            user_id,
        };
        let mut store = MockTableStore::new();
        store
            .expect_read()
            .withf(|key| matches!(key, RowKey::Credentials { .. }))
            .returning(move |_| {
                Ok(Some(TableRow::Credentials(CredentialsRow::from(
                    &credentials,
                ))))
            });
        store
    }

    fn verifying_hasher(outcome: bool) -> MockCredentialHasher {
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().returning(move |_, _| Ok(outcome));
        hasher
    }

    #[tokio::test]
    async fn unknown_email_returns_none_without_touching_the_hasher() {
        let mut store = MockTableStore::new();
        store
            .expect_read()
            .withf(|key| matches!(key, RowKey::Credentials { .. }))
            .returning(|_| Ok(None));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().times(0);

        let service = LoginService::new(Arc::new(store), Arc::new(hasher));
        let outcome = service
            .login(&email("ghost@example.com"), &password())
            .await
            .expect("lookup succeeds");

        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn wrong_password_returns_none() {
        let user_id = Uuid::new_v4();
        let service = LoginService::new(
            Arc::new(store_with_credentials(user_id, "ada@example.com")),
            Arc::new(verifying_hasher(false)),
        );

        let outcome = service
            .login(&email("ada@example.com"), &password())
            .await
            .expect("verification runs");

        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn matching_password_returns_the_user() {
        let user_id = Uuid::new_v4();
        let mut store = store_with_credentials(user_id, "ada@example.com");
        let user = stored_user(user_id, "ada@example.com");
        let row = UserRow::from(&user);
        store
            .expect_read()
            .withf(move |key| matches!(key, RowKey::User { user_id: id } if *id == user_id))
            .returning(move |_| Ok(Some(TableRow::User(row.clone()))));

        let service = LoginService::new(Arc::new(store), Arc::new(verifying_hasher(true)));
        let outcome = service
            .login(&email("ada@example.com"), &password())
            .await
            .expect("login succeeds");

        assert_eq!(outcome, Some(user));
    }

    #[tokio::test]
    async fn orphaned_credentials_are_an_invariant_violation() {
        let user_id = Uuid::new_v4();
        let mut store = store_with_credentials(user_id, "ada@example.com");
        store
            .expect_read()
            .withf(|key| matches!(key, RowKey::User { .. }))
            .returning(|_| Ok(None));

        let service = LoginService::new(Arc::new(store), Arc::new(verifying_hasher(true)));
        let err = service
            .login(&email("ada@example.com"), &password())
            .await
            .expect_err("orphaned credentials are fatal");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn corrupt_credentials_row_is_an_internal_error() {
        let mut store = MockTableStore::new();
        store
            .expect_read()
            .withf(|key| matches!(key, RowKey::Credentials { .. }))
            .returning(|_| {
                Ok(Some(TableRow::Credentials(CredentialsRow {
                    email: Email::new("ada@example.com").expect("valid email"),
                    password_hash: None,
                    user_id: Some(Uuid::new_v4()),
                })))
            });
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().times(0);

        let service = LoginService::new(Arc::new(store), Arc::new(hasher));
        let err = service
            .login(&email("ada@example.com"), &password())
            .await
            .expect_err("missing hash column is fatal");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn find_by_email_skips_password_verification() {
        let user_id = Uuid::new_v4();
        let mut store = store_with_credentials(user_id, "ada@example.com");
        let user = stored_user(user_id, "ada@example.com");
        let row = UserRow::from(&user);
        store
            .expect_read()
            .withf(|key| matches!(key, RowKey::User { .. }))
            .returning(move |_| Ok(Some(TableRow::User(row.clone()))));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().times(0);

        let service = LoginService::new(Arc::new(store), Arc::new(hasher));
        let outcome = service
            .find_by_email(&email("ada@example.com"))
            .await
            .expect("lookup succeeds");

        assert_eq!(outcome, Some(user));
    }
}
