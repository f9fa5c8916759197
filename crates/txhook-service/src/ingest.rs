//! Transaction ingestion.
//!
//! The [`Ingestor`] is the only writer of new records: it validates a webhook
//! payload, admits it through the store's atomic insert, and starts exactly one
//! completion worker for every first-seen transaction.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use txhook_core::{NewTransaction, Transaction, TransactionId};
use txhook_store::Store;

use crate::error::ApiError;
use crate::worker::CompletionWorkers;

/// Webhook payload as received, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPayload {
    /// External transaction id (required). Integers are accepted and kept as text.
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub transaction_id: Option<String>,
    /// Debited account.
    pub source_account: Option<String>,
    /// Credited account.
    pub destination_account: Option<String>,
    /// Amount, as a JSON number or numeric string.
    pub amount: Option<Decimal>,
    /// Currency code.
    pub currency: Option<String>,
}

impl TransactionPayload {
    /// Split into the validated id and the pass-through fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if `transaction_id` is missing or invalid.
    pub fn into_parts(self) -> Result<(TransactionId, NewTransaction), ApiError> {
        let transaction_id = TransactionId::parse(self.transaction_id.unwrap_or_default())?;
        let fields = NewTransaction {
            source_account: self.source_account,
            destination_account: self.destination_account,
            amount: self.amount,
            currency: self.currency,
        };
        Ok((transaction_id, fields))
    }
}

fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    }))
}

/// Outcome of a submission.
///
/// Both variants are answered identically over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// First sighting: recorded and scheduled for completion.
    Admitted,
    /// Already known: nothing changed.
    Duplicate,
}

/// Admits transactions and schedules their completion.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn Store>,
    workers: Arc<CompletionWorkers>,
}

impl Ingestor {
    /// Create an ingestor over `store`, spawning completions on `workers`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, workers: Arc<CompletionWorkers>) -> Self {
        Self { store, workers }
    }

    /// Submit a webhook payload.
    ///
    /// Returns once the transaction is admitted; the completion runs later.
    ///
    /// # Errors
    ///
    /// - `ApiError::InvalidRequest` if `transaction_id` is missing or empty.
    /// - `ApiError::StoreUnavailable` if the store cannot be reached.
    pub fn submit(&self, payload: TransactionPayload) -> Result<Submission, ApiError> {
        let (transaction_id, fields) = payload.into_parts()?;
        self.admit(transaction_id, fields)
    }

    /// Admit an already validated transaction.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::StoreUnavailable` if the store cannot be reached.
    pub fn admit(
        &self,
        transaction_id: TransactionId,
        fields: NewTransaction,
    ) -> Result<Submission, ApiError> {
        let transaction = Transaction::admit(transaction_id, fields, Utc::now());
        let admission = self.store.insert_if_absent(transaction)?;
        let transaction_id = admission.transaction.transaction_id;

        if admission.created {
            if self.workers.spawn(transaction_id.clone()) {
                tracing::info!(
                    transaction_id = %transaction_id,
                    delay_ms = u64::try_from(self.workers.delay().as_millis()).unwrap_or(u64::MAX),
                    "Transaction admitted, completion scheduled"
                );
            } else {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    "Transaction admitted, but no completion was scheduled"
                );
            }
            Ok(Submission::Admitted)
        } else {
            tracing::info!(
                transaction_id = %transaction_id,
                status = %admission.transaction.status,
                "Transaction already exists (idempotent)"
            );
            Ok(Submission::Duplicate)
        }
    }
}
