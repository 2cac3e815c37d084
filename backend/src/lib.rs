//! Client-side consistency layer over a partitioned, eventually-consistent
//! table store.
//!
//! The crate keeps denormalized views of a video catalogue mutually
//! consistent without multi-partition transactions: registration enforces
//! email uniqueness through a single-partition conditional write with
//! compensating deletes, creation fans a video out into its read views in
//! one logged batch, and credential verification resolves users through the
//! credentials back-reference. The storage backend itself is behind a port;
//! [`outbound`] carries the in-process adapters.

pub mod domain;
pub mod outbound;

#[cfg(test)]
pub(crate) mod test_support;
