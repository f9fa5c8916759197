//! Transaction status handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::status::{self, TransactionView};

/// Get the current state of a transaction.
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionView>, ApiError> {
    let transaction = status::get_status(state.store.as_ref(), &transaction_id)?;

    tracing::debug!(
        transaction_id = %transaction.transaction_id,
        status = %transaction.status,
        "Transaction status read"
    );

    Ok(Json(transaction.into()))
}
