//! Transaction status lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use txhook_core::{Transaction, TransactionId, TransactionStatus};
use txhook_store::Store;

use crate::error::ApiError;

/// Snapshot of a transaction as returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    /// External transaction id.
    pub transaction_id: String,
    /// Debited account.
    pub source_account: Option<String>,
    /// Credited account.
    pub destination_account: Option<String>,
    /// Amount as a JSON number.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    /// Currency code.
    pub currency: Option<String>,
    /// Current status.
    pub status: TransactionStatus,
    /// Admission time (RFC 3339).
    pub created_at: DateTime<Utc>,
    /// Completion time (RFC 3339), null while processing.
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id.into(),
            source_account: tx.source_account,
            destination_account: tx.destination_account,
            amount: tx.amount,
            currency: tx.currency,
            status: tx.status,
            created_at: tx.created_at,
            processed_at: tx.processed_at,
        }
    }
}

/// Look up a transaction by its raw id.
///
/// # Errors
///
/// - `ApiError::NotFound` if no transaction exists for `raw_id`.
/// - `ApiError::StoreUnavailable` if the store cannot be reached.
pub fn get_status(store: &dyn Store, raw_id: &str) -> Result<Transaction, ApiError> {
    let not_found = || ApiError::NotFound(format!("transaction not found: {raw_id}"));

    // An id that could never have been admitted cannot exist.
    let Ok(transaction_id) = TransactionId::parse(raw_id) else {
        return Err(not_found());
    };

    store
        .get_transaction(&transaction_id)?
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use txhook_core::NewTransaction;
    use txhook_store::MemoryStore;

    #[test]
    fn unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = get_status(&store, "does-not-exist").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn view_renders_amount_as_number() {
        let tx = Transaction::admit(
            TransactionId::parse("tx1").unwrap(),
            NewTransaction {
                amount: Some(Decimal::new(10050, 2)),
                currency: Some("USD".into()),
                ..NewTransaction::default()
            },
            Utc::now(),
        );

        let json = serde_json::to_value(TransactionView::from(tx)).unwrap();
        assert_eq!(json["amount"], serde_json::json!(100.5));
        assert_eq!(json["status"], "PROCESSING");
        assert!(json["processed_at"].is_null());
        assert!(json["source_account"].is_null());
    }

    #[test]
    fn view_renders_missing_amount_as_null() {
        let tx = Transaction::admit(
            TransactionId::parse("tx2").unwrap(),
            NewTransaction::default(),
            Utc::now(),
        );
        let json = serde_json::to_value(TransactionView::from(tx)).unwrap();
        assert!(json["amount"].is_null());
    }
}
