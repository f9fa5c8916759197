//! txhook HTTP client implementation.

use std::time::Duration;

use reqwest::{Client, Url};
use tokio::time::Instant;

use crate::error::ClientError;
use crate::types::{
    AcceptedResponse, ApiErrorResponse, HealthResponse, SubmitTransaction, TransactionRecord,
};

/// txhook API client.
///
/// Submits transaction webhooks and reads back their status.
#[derive(Debug, Clone)]
pub struct TxhookClient {
    client: Client,
    base_url: Url,
}

impl TxhookClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the txhook service (e.g., `"http://txhook:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL cannot be used as a base.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL cannot be used as a base,
    /// or `ClientError::Http` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl AsRef<str>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.as_ref().trim_end_matches('/'))
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Submit a transaction webhook.
    ///
    /// Resubmitting an id the service has already seen succeeds without
    /// changing the stored transaction.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRequest` if the service rejects the payload,
    /// or another error if the request fails.
    pub async fn submit_transaction(
        &self,
        request: &SubmitTransaction,
    ) -> Result<AcceptedResponse, ClientError> {
        let url = self.endpoint(&["v1", "webhooks", "transactions"])?;

        let response = self.client.post(url).json(request).send().await?;

        self.handle_response(response, &request.transaction_id).await
    }

    /// Fetch the current status of a transaction.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the service has no such transaction.
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, ClientError> {
        let url = self.endpoint(&["v1", "transactions", transaction_id])?;

        let response = self.client.get(url).send().await?;

        self.handle_response(response, transaction_id).await
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.base_url.clone()).send().await?;

        self.handle_response(response, "").await
    }

    /// Poll until a transaction is processed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Timeout` if the transaction is still processing
    /// once `timeout` has elapsed, or any error from the status lookup.
    pub async fn wait_until_processed(
        &self,
        transaction_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<TransactionRecord, ClientError> {
        let deadline = Instant::now() + timeout;

        loop {
            let record = self.get_transaction(transaction_id).await?;
            if record.is_processed() {
                return Ok(record);
            }

            if Instant::now() + poll_interval > deadline {
                return Err(ClientError::Timeout {
                    transaction_id: transaction_id.to_string(),
                });
            }

            tracing::debug!(transaction_id, status = %record.status, "Waiting for completion");
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Build an endpoint URL under the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        transaction_id: &str,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => match api_error.code.as_deref().unwrap_or("unknown") {
                "not_found" => Err(ClientError::NotFound {
                    transaction_id: transaction_id.to_string(),
                }),
                "invalid_request" => Err(ClientError::InvalidRequest(api_error.error)),
                code => Err(ClientError::Api {
                    code: code.to_string(),
                    message: api_error.error,
                    status: status.as_u16(),
                }),
            },
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
