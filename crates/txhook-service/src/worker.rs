//! Completion workers.
//!
//! Every admitted transaction gets exactly one detached task that waits out the
//! simulated downstream call and then marks the transaction `PROCESSED`. Tasks
//! are owned by a [`JoinSet`] so shutdown can wait for them. The delay starts
//! at spawn for every task; a semaphore only bounds concurrent store writes.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use txhook_core::{TransactionId, TransactionStatus};
use txhook_store::{Store, StoreError};

/// Why a completion did not apply. Never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The record disappeared before the downstream call returned.
    #[error("transaction {transaction_id} not found at completion time")]
    Stale {
        /// The transaction being completed.
        transaction_id: TransactionId,
    },

    /// The store rejected the update.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The permit semaphore was closed before the write could start.
    #[error("completion permits closed")]
    Closed,
}

/// Result of [`CompletionWorkers::drain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Tasks outstanding when the drain started.
    pub outstanding: usize,
    /// Tasks that finished within the grace period.
    pub finished: usize,
    /// Tasks aborted when the grace period ran out.
    pub aborted: usize,
}

/// Pool of completion tasks.
pub struct CompletionWorkers {
    store: Arc<dyn Store>,
    delay: Duration,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
    spawned: AtomicU64,
    in_flight: Arc<AtomicUsize>,
}

impl CompletionWorkers {
    /// Create a pool completing transactions after `delay`, with at most
    /// `max_concurrent` completion writes running at once.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, delay: Duration, max_concurrent: usize) -> Self {
        Self {
            store,
            delay,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
            spawned: AtomicU64::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Schedule the completion of `transaction_id` and return immediately.
    ///
    /// Returns `false` if the pool has been drained and no longer accepts work.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, transaction_id: TransactionId) -> bool {
        let mut tasks = self.tasks.lock();

        if self.closed.load(Ordering::SeqCst) {
            tracing::warn!(
                transaction_id = %transaction_id,
                "Completion pool is closed, transaction stays PROCESSING"
            );
            return false;
        }

        // Reap finished tasks so the set does not grow with history.
        while tasks.try_join_next().is_some() {}

        let store = Arc::clone(&self.store);
        let permits = Arc::clone(&self.permits);
        let delay = self.delay;
        let in_flight = InFlight::enter(&self.in_flight);

        self.spawned.fetch_add(1, Ordering::SeqCst);
        tasks.spawn(async move {
            let _in_flight = in_flight;

            match complete_after(store.as_ref(), &transaction_id, delay, &permits).await {
                Ok(()) => {
                    tracing::info!(transaction_id = %transaction_id, "Transaction processed");
                }
                Err(e @ CompletionError::Stale { .. }) => {
                    tracing::warn!(transaction_id = %transaction_id, error = %e, "Stale completion");
                }
                Err(e) => {
                    tracing::error!(
                        transaction_id = %transaction_id,
                        error = %e,
                        "Failed to complete transaction"
                    );
                }
            }
        });

        true
    }

    /// Total number of completion tasks ever spawned.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Number of completion tasks that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Configured completion delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Stop accepting work and wait up to `grace` for outstanding tasks.
    ///
    /// Tasks still running when `grace` elapses are aborted; their
    /// transactions stay `PROCESSING`.
    pub async fn drain(&self, grace: Duration) -> DrainReport {
        let mut tasks = {
            let mut guard = self.tasks.lock();
            self.closed.store(true, Ordering::SeqCst);
            std::mem::replace(&mut *guard, JoinSet::new())
        };

        let outstanding = tasks.len();
        let mut finished = 0;

        let wait = async {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Completion task failed");
                }
                finished += 1;
            }
        };
        let timed_out = tokio::time::timeout(grace, wait).await.is_err();

        let aborted = if timed_out {
            let remaining = tasks.len();
            tasks.shutdown().await;
            remaining
        } else {
            0
        };

        let report = DrainReport {
            outstanding,
            finished,
            aborted,
        };
        tracing::info!(
            outstanding = report.outstanding,
            finished = report.finished,
            aborted = report.aborted,
            "Completion workers drained"
        );
        report
    }
}

/// Wait `delay`, then mark `transaction_id` as processed while holding one
/// of `permits`.
///
/// # Errors
///
/// - [`CompletionError::Stale`] if the record no longer exists.
/// - [`CompletionError::Store`] if the update fails.
/// - [`CompletionError::Closed`] if `permits` was closed.
pub async fn complete_after(
    store: &dyn Store,
    transaction_id: &TransactionId,
    delay: Duration,
    permits: &Semaphore,
) -> Result<(), CompletionError> {
    tokio::time::sleep(delay).await;

    let _permit = permits
        .acquire()
        .await
        .map_err(|_| CompletionError::Closed)?;

    if store.update_status(transaction_id, TransactionStatus::Processed, Utc::now())? {
        Ok(())
    } else {
        Err(CompletionError::Stale {
            transaction_id: transaction_id.clone(),
        })
    }
}

/// Decrements the in-flight counter when a task ends, including on abort.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txhook_core::{NewTransaction, Transaction};
    use txhook_store::MemoryStore;

    const DELAY: Duration = Duration::from_secs(30);

    fn seeded(id: &str) -> (Arc<MemoryStore>, TransactionId) {
        let store = Arc::new(MemoryStore::new());
        let id = TransactionId::parse(id).unwrap();
        store
            .insert_if_absent(Transaction::admit(
                id.clone(),
                NewTransaction::default(),
                Utc::now(),
            ))
            .unwrap();
        (store, id)
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_delay() {
        let (store, id) = seeded("tx1");
        let workers = CompletionWorkers::new(store.clone(), DELAY, 4);

        assert!(workers.spawn(id.clone()));
        assert_eq!(workers.in_flight(), 1);

        tokio::time::sleep(DELAY / 2).await;
        let pending = store.get_transaction(&id).unwrap().unwrap();
        assert_eq!(pending.status, TransactionStatus::Processing);

        tokio::time::sleep(DELAY).await;
        let done = store.get_transaction(&id).unwrap().unwrap();
        assert_eq!(done.status, TransactionStatus::Processed);
        assert!(done.processed_at.unwrap() >= done.created_at);
        assert_eq!(workers.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let workers = CompletionWorkers::new(store.clone(), DELAY, 4);

        workers.spawn(TransactionId::parse("ghost").unwrap());
        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(workers.spawned(), 1);
        assert_eq!(workers.in_flight(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn complete_after_reports_stale() {
        let store = MemoryStore::new();
        let id = TransactionId::parse("ghost").unwrap();

        let permits = Semaphore::new(1);

        let result = complete_after(&store, &id, Duration::ZERO, &permits).await;
        assert!(matches!(result, Err(CompletionError::Stale { .. })));
        assert_eq!(permits.available_permits(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn complete_after_reports_closed_permits() {
        let (store, id) = seeded("tx1");
        let permits = Semaphore::new(1);
        permits.close();

        let result = complete_after(store.as_ref(), &id, Duration::ZERO, &permits).await;
        assert!(matches!(result, Err(CompletionError::Closed)));
        assert!(!store.get_transaction(&id).unwrap().unwrap().is_processed());
    }

    #[tokio::test(start_paused = true)]
    async fn every_task_completes_after_one_delay_beyond_permit_limit() {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for n in 0..50 {
            let id = TransactionId::parse(format!("tx{n}")).unwrap();
            store
                .insert_if_absent(Transaction::admit(
                    id.clone(),
                    NewTransaction::default(),
                    Utc::now(),
                ))
                .unwrap();
            ids.push(id);
        }

        let workers = CompletionWorkers::new(store.clone(), DELAY, 2);
        for id in &ids {
            assert!(workers.spawn(id.clone()));
        }

        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(workers.in_flight(), ids.len());

        tokio::time::sleep(DELAY / 2 + Duration::from_secs(1)).await;
        let processed = ids
            .iter()
            .filter(|id| store.get_transaction(id).unwrap().unwrap().is_processed())
            .count();
        assert_eq!(processed, ids.len());
        assert_eq!(workers.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_outstanding_work() {
        let (store, id) = seeded("tx1");
        let workers = CompletionWorkers::new(store.clone(), DELAY, 4);
        workers.spawn(id.clone());

        let report = workers.drain(DELAY * 2).await;
        assert_eq!(
            report,
            DrainReport {
                outstanding: 1,
                finished: 1,
                aborted: 0
            }
        );
        assert!(store.get_transaction(&id).unwrap().unwrap().is_processed());
        assert!(!workers.spawn(id));
    }

    #[tokio::test(start_paused = true)]
    async fn drain_aborts_after_grace() {
        let (store, id) = seeded("tx1");
        let workers = CompletionWorkers::new(store.clone(), DELAY, 4);
        workers.spawn(id.clone());

        let report = workers.drain(Duration::from_secs(1)).await;
        assert_eq!(report.aborted, 1);
        assert_eq!(workers.in_flight(), 0);
        assert_eq!(
            store.get_transaction(&id).unwrap().unwrap().status,
            TransactionStatus::Processing
        );
    }
}
