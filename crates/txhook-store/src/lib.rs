//! Storage layer for txhook.
//!
//! This crate owns every transaction record. Callers never mutate a record
//! directly; they go through the two atomic entry points of [`Store`]:
//!
//! - [`Store::insert_if_absent`] admits a transaction exactly once per id
//! - [`Store::update_status`] applies the single `PROCESSING -> PROCESSED` transition
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, always available
//! - `RocksStore`: `RocksDB` column family, behind the `rocksdb-backend` feature
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use txhook_core::{NewTransaction, Transaction, TransactionId};
//! use txhook_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let id = TransactionId::parse("tx1").unwrap();
//! let tx = Transaction::admit(id.clone(), NewTransaction::default(), Utc::now());
//!
//! assert!(store.insert_if_absent(tx.clone()).unwrap().created);
//! assert!(!store.insert_if_absent(tx).unwrap().created);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use txhook_core::{Transaction, TransactionId, TransactionStatus};

/// Outcome of [`Store::insert_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The stored record: the new one when `created`, otherwise the existing one.
    pub transaction: Transaction,
    /// Whether this call performed the insert.
    pub created: bool,
}

/// The storage trait defining all transaction operations.
///
/// Implementations must make [`Store::insert_if_absent`] atomic per key: among
/// any number of concurrent callers with the same id, exactly one observes
/// `created = true`.
pub trait Store: Send + Sync {
    /// Insert `transaction` unless a record with the same id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn insert_if_absent(&self, transaction: Transaction) -> Result<Admission>;

    /// Move a transaction to `status`, stamping `processed_at`.
    ///
    /// Returns `Ok(false)` when no record exists for `transaction_id`.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidTransition` if `status` cannot follow the current one.
    /// - `StoreError::Database` if the backend operation fails.
    fn update_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>>;

    /// Number of stored transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend operation fails.
    fn count(&self) -> Result<usize>;
}
