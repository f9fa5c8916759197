//! Transaction records and their lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransitionError;
use crate::TransactionId;

/// Processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Admitted and waiting for the downstream confirmation.
    Processing,
    /// Confirmed by the downstream call. Terminal.
    Processed,
}

impl TransactionStatus {
    /// Whether `next` may directly follow this status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Processing, Self::Processed))
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Processed => "PROCESSED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller supplied fields of a transaction, passed through opaquely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Debited account.
    pub source_account: Option<String>,
    /// Credited account.
    pub destination_account: Option<String>,
    /// Transferred amount.
    pub amount: Option<Decimal>,
    /// ISO currency code, as supplied.
    pub currency: Option<String>,
}

/// A stored transaction.
///
/// `processed_at` is set iff `status` is [`TransactionStatus::Processed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// External identifier (dedup key).
    pub transaction_id: TransactionId,

    /// Debited account.
    pub source_account: Option<String>,

    /// Credited account.
    pub destination_account: Option<String>,

    /// Transferred amount.
    pub amount: Option<Decimal>,

    /// Currency code.
    pub currency: Option<String>,

    /// Current status.
    pub status: TransactionStatus,

    /// When the transaction was admitted.
    pub created_at: DateTime<Utc>,

    /// When the transaction was completed.
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Build a freshly admitted transaction in `PROCESSING`.
    #[must_use]
    pub fn admit(transaction_id: TransactionId, fields: NewTransaction, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id,
            source_account: fields.source_account,
            destination_account: fields.destination_account,
            amount: fields.amount,
            currency: fields.currency,
            status: TransactionStatus::Processing,
            created_at: now,
            processed_at: None,
        }
    }

    /// Mark the transaction as processed at `at`.
    ///
    /// A completion time earlier than `created_at` is clamped to `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyProcessed`] if the transaction was
    /// already completed.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyProcessed {
                transaction_id: self.transaction_id.to_string(),
            });
        }

        self.status = TransactionStatus::Processed;
        self.processed_at = Some(at.max(self.created_at));
        Ok(())
    }

    /// Move the transaction to `next`, stamping `at` when it becomes terminal.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] unless `next` may follow the current status.
    pub fn transition_to(
        &mut self,
        next: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() && next.is_terminal() {
            return self.complete(at);
        }
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::Illegal {
                transaction_id: self.transaction_id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.complete(at)
    }

    /// Whether the transaction has been completed.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.status.is_terminal()
    }
}
