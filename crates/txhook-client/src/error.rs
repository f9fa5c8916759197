//! Client error types.

/// Errors that can occur when using the txhook client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the submission.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No transaction exists for the id.
    #[error("transaction not found: {transaction_id}")]
    NotFound {
        /// The transaction id.
        transaction_id: String,
    },

    /// Server returned another error response.
    #[error("API error: {status} {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The transaction was not processed before the deadline.
    #[error("timed out waiting for transaction {transaction_id}")]
    Timeout {
        /// The transaction id.
        transaction_id: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
