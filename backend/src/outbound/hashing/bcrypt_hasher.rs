//! Bcrypt-backed implementation of the credential hasher port.
//!
//! Bcrypt salts every hash itself and embeds the salt in the modular-crypt
//! output, so storage needs a single string column and verification needs no
//! separate salt handling.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::domain::credentials::{Password, PasswordHash};
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Validation errors returned when constructing a [`BcryptCost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BcryptCostError {
    /// Cost factor was outside bcrypt's supported range.
    #[error("bcrypt cost must be between {min} and {max}, got {got}")]
    OutOfRange {
        /// Lowest supported cost.
        min: u32,
        /// Highest supported cost.
        max: u32,
        /// Rejected value.
        got: u32,
    },
}

// The range bcrypt itself accepts; the crate rejects anything outside it.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Validated bcrypt cost factor.
///
/// The cost is a deployment-wide configuration constant: doubling work per
/// increment, chosen once for the hardware the verifier runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptCost(u32);

impl BcryptCost {
    /// The deployment default, matching `bcrypt::DEFAULT_COST` (12).
    pub const DEFAULT: Self = Self(bcrypt::DEFAULT_COST);

    /// Cheapest cost bcrypt accepts; useful for fast tests, never for
    /// production credentials.
    pub const MIN: Self = Self(MIN_COST);

    /// Validate and construct a cost factor.
    ///
    /// # Examples
    /// ```
    /// use reelvault_backend::outbound::hashing::BcryptCost;
    ///
    /// let cost = BcryptCost::new(12).expect("valid cost");
    /// assert_eq!(cost.factor(), 12);
    /// assert!(BcryptCost::new(3).is_err());
    /// ```
    pub fn new(cost: u32) -> Result<Self, BcryptCostError> {
        if (MIN_COST..=MAX_COST).contains(&cost) {
            Ok(Self(cost))
        } else {
            Err(BcryptCostError::OutOfRange {
                min: MIN_COST,
                max: MAX_COST,
                got: cost,
            })
        }
    }

    /// The raw cost factor.
    pub const fn factor(self) -> u32 {
        self.0
    }
}

impl Default for BcryptCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BcryptCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bcrypt-backed credential hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHasher {
    cost: BcryptCost,
}

impl BcryptHasher {
    /// Create a hasher with the given cost factor.
    pub const fn new(cost: BcryptCost) -> Self {
        Self { cost }
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError> {
        let digest = bcrypt::hash(password.expose(), self.cost.factor()).map_err(|err| {
            debug!(cost = %self.cost, error = %err, "bcrypt hashing failed");
            CredentialHashError::hash(err.to_string())
        })?;
        PasswordHash::new(digest).map_err(|err| CredentialHashError::hash(err.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHashError> {
        bcrypt::verify(password.expose(), hash.as_str()).map_err(|err| {
            debug!(error = %err, "bcrypt verification failed on the stored hash");
            CredentialHashError::malformed_hash(err.to_string())
        })
    }
}
