//! Table store adapters.
//!
//! The in-memory store is the reference implementation of the
//! [`crate::domain::ports::TableStore`] contract: conditional writes and
//! guarded deletes are evaluated under one lock (trivially linearizable),
//! plain writes merge sparse rows column by column, and batches apply in a
//! single critical section. A driver-backed adapter for a real wide-column
//! store would slot in beside it.

mod memory_table_store;

pub use memory_table_store::InMemoryTableStore;
