//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options,
};

use txhook_core::{Transaction, TransactionId, TransactionStatus};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Admission, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // RocksDB has no conditional put; every read-check-write runs under this lock.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn put_transaction(&self, transaction: &Transaction) -> Result<()> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(&transaction.transaction_id);
        let value = Self::serialize(transaction)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    fn insert_if_absent(&self, transaction: Transaction) -> Result<Admission> {
        let _guard = self.write_lock.lock();

        if let Some(existing) = self.get_transaction(&transaction.transaction_id)? {
            return Ok(Admission {
                transaction: existing,
                created: false,
            });
        }

        self.put_transaction(&transaction)?;

        Ok(Admission {
            transaction,
            created: true,
        })
    }

    fn update_status(
        &self,
        transaction_id: &TransactionId,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock();

        let Some(mut transaction) = self.get_transaction(transaction_id)? else {
            tracing::warn!(
                transaction_id = %transaction_id,
                "Transaction not found for status update"
            );
            return Ok(false);
        };

        transaction.transition_to(status, processed_at)?;
        self.put_transaction(&transaction)?;

        Ok(true)
    }

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn count(&self) -> Result<usize> {
        let cf = self.cf(cf::TRANSACTIONS)?;

        let mut count = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Database(e.to_string()))?;
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use txhook_core::NewTransaction;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn admit(id: &str) -> Transaction {
        Transaction::admit(
            TransactionId::parse(id).unwrap(),
            NewTransaction {
                source_account: Some("acc-1".into()),
                destination_account: Some("acc-2".into()),
                amount: Some(Decimal::new(10050, 2)),
                currency: Some("USD".into()),
            },
            Utc::now(),
        )
    }

    #[test]
    fn insert_get_and_complete() {
        let (store, _dir) = create_test_store();
        let tx = admit("tx1");
        let id = tx.transaction_id.clone();

        let admission = store.insert_if_absent(tx.clone()).unwrap();
        assert!(admission.created);

        let retrieved = store.get_transaction(&id).unwrap().unwrap();
        assert_eq!(retrieved, tx);
        assert_eq!(retrieved.amount, Some(Decimal::new(10050, 2)));

        assert!(store
            .update_status(&id, TransactionStatus::Processed, Utc::now())
            .unwrap());
        let completed = store.get_transaction(&id).unwrap().unwrap();
        assert_eq!(completed.status, TransactionStatus::Processed);
        assert_eq!(completed.created_at, tx.created_at);
    }

    #[test]
    fn duplicate_insert_returns_existing() {
        let (store, _dir) = create_test_store();
        store.insert_if_absent(admit("tx1")).unwrap();

        let mut other = admit("tx1");
        other.currency = Some("EUR".into());
        let admission = store.insert_if_absent(other).unwrap();

        assert!(!admission.created);
        assert_eq!(admission.transaction.currency.as_deref(), Some("USD"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn concurrent_duplicates_create_once() {
        let (store, _dir) = create_test_store();
        let created = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    if store.insert_if_absent(admit("tx-race")).unwrap().created {
                        created.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn missing_update_returns_false() {
        let (store, _dir) = create_test_store();
        let id = TransactionId::parse("ghost").unwrap();
        assert!(!store
            .update_status(&id, TransactionStatus::Processed, Utc::now())
            .unwrap());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let tx = admit("tx-persist");
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store.insert_if_absent(tx.clone()).unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        assert_eq!(
            store.get_transaction(&tx.transaction_id).unwrap(),
            Some(tx.clone())
        );
        assert!(!store.insert_if_absent(tx).unwrap().created);
    }
}
