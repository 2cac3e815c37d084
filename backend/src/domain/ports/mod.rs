//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the coordinators expect to interact with driven
//! adapters (the table store, the password hasher). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants, and each carries a `mockall` mock for service-level tests.

mod credential_hasher;
mod table_store;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
#[cfg(test)]
pub use table_store::MockTableStore;
pub use table_store::{DeleteGuard, TableStore, TableStoreError, WriteMode};
