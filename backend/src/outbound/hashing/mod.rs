//! Credential hasher adapters.

mod bcrypt_hasher;

pub use bcrypt_hasher::{BcryptCost, BcryptCostError, BcryptHasher};
