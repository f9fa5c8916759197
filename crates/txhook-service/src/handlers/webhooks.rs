//! Transaction webhook handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::ingest::TransactionPayload;
use crate::state::AppState;

/// Query parameters accepted alongside the webhook body.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    /// Fallback transaction id when the body carries none.
    pub transaction_id: Option<String>,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Always `Accepted`.
    pub message: &'static str,
}

/// Receive a transaction webhook.
///
/// First-seen and duplicate submissions get the same 202 response.
pub async fn receive_transaction(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookQuery>,
    request: Request,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let mut payload = parse_payload(request).await?;

    let has_body_id = payload
        .transaction_id
        .as_deref()
        .is_some_and(|id| !id.is_empty());
    if !has_body_id && query.transaction_id.is_some() {
        payload.transaction_id = query.transaction_id;
    }

    let submission = state.ingestor.submit(payload)?;
    tracing::debug!(?submission, "Transaction webhook handled");

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            message: "Accepted",
        }),
    ))
}

/// Decode the webhook body as form data or JSON.
///
/// An empty body yields an empty payload so the query string can still
/// supply the id.
async fn parse_payload(request: Request) -> Result<TransactionPayload, ApiError> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });

    if is_form {
        let Form(payload) = Form::<TransactionPayload>::from_request(request, &())
            .await
            .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;
        return Ok(payload);
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| ApiError::from_rejection(e.status(), e.body_text()))?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(TransactionPayload::default());
    }

    serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("malformed request body: {e}")))
}
