use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::error::ApiError;
use crate::models::{ServingRequest, ServingResponse};

/// HTTP client for the model serving endpoint
///
/// Issues exactly one request per call. Failures are returned to the caller
/// as [`ApiError::Upstream`] and never retried.
#[derive(Clone)]
pub struct ServingClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Full URL of the serving endpoint
    endpoint: Url,

    /// Bearer token for the endpoint
    api_key: String,
}

impl ServingClient {
    /// Create a new serving client
    pub fn new(endpoint: Url, api_key: String, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Forward a single user message and return the completion text
    pub async fn complete(&self, message: &str) -> Result<String, ApiError> {
        let payload = ServingRequest::user_message(message);

        tracing::debug!(
            url = %self.endpoint,
            message_len = message.len(),
            "Sending request to serving endpoint"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error_kind = error_kind(&e),
                    error = %e,
                    url = %self.endpoint,
                    "Serving endpoint request error"
                );
                ApiError::Upstream(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "Received serving endpoint response");

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, status = %status, "Failed to read error response body");
                    format!("<failed to read response body: {}>", e)
                }
            };
            return Err(ApiError::Upstream(format!(
                "Serving endpoint returned {}: {}",
                status, body
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        extract_content(&body)
    }

    /// Get the configured endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Pull `choices[0].message.content` out of a serving endpoint response body
pub fn extract_content(body: &[u8]) -> Result<String, ApiError> {
    let parsed: ServingResponse = serde_json::from_slice(body).map_err(|e| {
        ApiError::Upstream(format!("Invalid response from serving endpoint: {}", e))
    })?;

    parsed
        .first_content()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Upstream("Serving endpoint returned no choices".to_string()))
}

/// Categorize a transport error for logging
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}
