//! Request and response types for the txhook client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use txhook_core::TransactionStatus;

/// A transaction webhook to submit.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTransaction {
    /// Unique transaction id; resubmitting the same id is a no-op.
    pub transaction_id: String,
    /// Debited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    /// Credited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<String>,
    /// Amount, sent as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SubmitTransaction {
    /// Start a submission for `transaction_id`.
    #[must_use]
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            source_account: None,
            destination_account: None,
            amount: None,
            currency: None,
        }
    }

    /// Set the source account.
    #[must_use]
    pub fn source_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = Some(account.into());
        self
    }

    /// Set the destination account.
    #[must_use]
    pub fn destination_account(mut self, account: impl Into<String>) -> Self {
        self.destination_account = Some(account.into());
        self
    }

    /// Set the amount.
    #[must_use]
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the currency.
    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Submission acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptedResponse {
    /// Always `Accepted`.
    pub message: String,
}

/// Transaction status as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    /// Transaction id.
    pub transaction_id: String,
    /// Debited account.
    pub source_account: Option<String>,
    /// Credited account.
    pub destination_account: Option<String>,
    /// Amount.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    /// Currency code.
    pub currency: Option<String>,
    /// Current status.
    pub status: TransactionStatus,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// Completion time.
    pub processed_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Whether the transaction has been processed.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// `HEALTHY` when the service is up.
    pub status: String,
    /// Server time.
    pub current_time: DateTime<Utc>,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}
