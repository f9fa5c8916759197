//! Error types for txhook domain operations.

use crate::transaction::TransactionStatus;

/// Errors produced when parsing a [`crate::TransactionId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier was missing or empty.
    #[error("transaction_id is required")]
    Empty,
}

/// Errors produced by an illegal status transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The transaction was already completed.
    #[error("transaction {transaction_id} is already processed")]
    AlreadyProcessed {
        /// The transaction that was completed twice.
        transaction_id: String,
    },

    /// The requested status cannot follow the current one.
    #[error("transaction {transaction_id} cannot move from {from} to {to}")]
    Illegal {
        /// The transaction being updated.
        transaction_id: String,
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },
}
