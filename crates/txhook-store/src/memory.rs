//! In-memory storage implementation.
//!
//! Records live for the lifetime of the process. Used by tests and by the
//! service when no persistent backend is configured.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use txhook_core::{Transaction, TransactionId, TransactionStatus};

use crate::error::Result;
use crate::{Admission, Store};

/// A thread-safe in-memory transaction store.
///
/// Both mutations take the write lock for their whole check-and-modify step,
/// so no caller can observe a half-applied admission or completion.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl MemoryStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_if_absent(&self, transaction: Transaction) -> Result<Admission> {
        let mut transactions = self.transactions.write();

        match transactions.entry(transaction.transaction_id.clone()) {
            Entry::Occupied(existing) => Ok(Admission {
                transaction: existing.get().clone(),
                created: false,
            }),
            Entry::Vacant(slot) => {
                slot.insert(transaction.clone());
                Ok(Admission {
                    transaction,
                    created: true,
                })
            }
        }
    }

    fn update_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut transactions = self.transactions.write();

        let Some(transaction) = transactions.get_mut(transaction_id) else {
            tracing::warn!(
                transaction_id = %transaction_id,
                "Transaction not found for status update"
            );
            return Ok(false);
        };

        // Apply to a copy so a rejected transition leaves the record untouched.
        let mut updated = transaction.clone();
        updated.transition_to(status, processed_at)?;
        *transaction = updated;

        Ok(true)
    }

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().get(transaction_id).cloned())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.transactions.read().len())
    }
}
