/*!
 * Client for a remote round-trip translation backend.
 *
 * The backend exposes `POST /api/translate` taking `{"text": ...}` and
 * answering with the four round-trip fields, or `{"error": ...}` with a
 * non-success status.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::gateway::{RoundTrip, TranslationGateway};

/// Default local backend endpoint
pub const DEFAULT_BACKEND_ENDPOINT: &str = "http://localhost:8080";

/// Gateway backed by the remote translation service
#[derive(Debug)]
pub struct BackendGateway {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the backend
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl BackendGateway {
    /// Create a new backend client
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_BACKEND_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/api/translate", base)
    }
}

#[async_trait]
impl TranslationGateway for BackendGateway {
    async fn translate(&self, text: &str) -> Result<RoundTrip, ProviderError> {
        let url = self.api_url();
        debug!("POST {} ({} chars)", url, text.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&TranslateRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            error!("Translation backend error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<RoundTrip>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}
