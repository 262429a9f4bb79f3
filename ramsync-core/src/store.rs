//! Bulk-load seam for destination storage.

use thiserror::Error;

use crate::rows::{Table, TableRow};

/// Insert batches of typed rows into the destination store.
///
/// Each call to [`load`](Self::load) is atomic: the rows are inserted inside
/// one transaction which is committed on success and discarded on any
/// failure, so a rejected batch leaves the table untouched.
pub trait RowStore {
    /// Insert `rows` into `R::TABLE` and commit, returning the row count.
    ///
    /// An empty slice is a no-op returning zero.
    fn load<R: TableRow>(&mut self, rows: &[R]) -> Result<usize, LoadError>;
}

/// Errors raised while loading a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A row broke a primary-key, uniqueness or foreign-key constraint.
    #[error("batch for {table} violates a constraint: {message}")]
    ConstraintViolation {
        /// Table whose batch was rejected.
        table: Table,
        /// Storage-layer description of the violation.
        message: String,
    },
    /// The store failed for a reason other than a constraint.
    #[error("failed to {operation} for {table}: {message}")]
    Storage {
        /// Table being loaded.
        table: Table,
        /// Step that failed (e.g. `commit transaction`).
        operation: &'static str,
        /// Storage-layer error description.
        message: String,
    },
}

impl LoadError {
    /// Table whose batch failed.
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::ConstraintViolation { table, .. } | Self::Storage { table, .. } => *table,
        }
    }
}
