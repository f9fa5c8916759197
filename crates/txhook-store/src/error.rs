//! Error types for txhook storage.

use txhook_core::{TransactionStatus, TransitionError};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed or the backend is unreachable.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The requested status change is not a legal transition.
    #[error("invalid transition for {transaction_id}: {from} -> {to}")]
    InvalidTransition {
        /// The transaction being updated.
        transaction_id: String,
        /// Stored status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },
}

impl From<TransitionError> for StoreError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyProcessed { transaction_id } => Self::InvalidTransition {
                transaction_id,
                from: TransactionStatus::Processed,
                to: TransactionStatus::Processed,
            },
            TransitionError::Illegal {
                transaction_id,
                from,
                to,
            } => Self::InvalidTransition {
                transaction_id,
                from,
                to,
            },
        }
    }
}
