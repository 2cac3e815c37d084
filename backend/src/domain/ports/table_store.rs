//! Driven port for the partitioned table store.
//!
//! The store is the only place the uniqueness invariant can actually be
//! enforced: conditional writes and guarded deletes must be evaluated with
//! linearizable consistency on the addressed partition. The coordinators
//! hold no client-side locks and never retry; they issue a bounded sequence
//! of calls against this port and compensate on failure.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::tables::{PartitionKey, RowKey, TableRow};

/// How a write is conditioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Plain single-partition write; absent columns are left untouched.
    Upsert,
    /// Apply only when no row exists under the key. The rejection is a
    /// normal outcome, reported through the `applied` flag.
    IfNotExists,
}

/// How a delete is conditioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteGuard {
    /// Unconditional delete.
    None,
    /// Apply only when a row exists under the key.
    IfExists,
    /// Apply only when the stored row's user back-reference equals the
    /// given id. Compensating deletes use this so a losing racer can never
    /// remove a row written by the winner.
    IfOwnedBy(Uuid),
}

/// Errors surfaced by table store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableStoreError {
    /// The store is unreachable or timing out; a transient condition.
    #[error("table store unavailable: {message}")]
    Unavailable {
        /// Adapter-provided description of the outage.
        message: String,
    },
    /// A statement failed during execution.
    #[error("table store query failed: {message}")]
    Query {
        /// Adapter-provided description of the failure.
        message: String,
    },
}

impl TableStoreError {
    /// Helper for transient availability failures.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for statement execution failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port over a partitioned, eventually-consistent table store.
///
/// Required consistency contract, per operation:
///
/// - `write` with [`WriteMode::IfNotExists`] and `delete` with a guard are
///   linearizable on the addressed partition.
/// - `batch_write` applies every row or none, regardless of partition
///   spread — an atomicity-on-completion guarantee, not an isolation
///   guarantee; concurrent readers may observe a torn batch mid-flight.
/// - `read_partition` returns the partition's rows ordered by clustering
///   key ascending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Write one row, returning whether the write was applied.
    ///
    /// Plain upserts always report `true`; a conditional write reports
    /// `false` when the condition did not hold.
    async fn write(&self, row: &TableRow, mode: WriteMode) -> Result<bool, TableStoreError>;

    /// Delete one row by full primary key, returning whether a row was
    /// removed under the guard.
    async fn delete(&self, key: &RowKey, guard: DeleteGuard) -> Result<bool, TableStoreError>;

    /// Apply a logged batch: every row or none.
    async fn batch_write(&self, rows: &[TableRow]) -> Result<(), TableStoreError>;

    /// Point read by full primary key.
    async fn read(&self, key: &RowKey) -> Result<Option<TableRow>, TableStoreError>;

    /// Read every row under a partition prefix, clustering key ascending.
    async fn read_partition(&self, key: &PartitionKey) -> Result<Vec<TableRow>, TableStoreError>;
}
