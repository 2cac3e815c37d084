//! Outbound adapters implementing domain ports.
//!
//! Adapters are thin translators between the port vocabulary and an
//! infrastructure concern; they contain no business logic.
//!
//! - **persistence**: the in-memory table store, honouring the port's
//!   conditional-write and logged-batch contract.
//! - **hashing**: bcrypt-backed credential hashing.

pub mod hashing;
pub mod persistence;
