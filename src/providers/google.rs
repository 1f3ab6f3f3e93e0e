/*!
 * Google Cloud Translation (v2 REST) client.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;

use super::TextTranslator;

/// Default public endpoint
pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://translation.googleapis.com";

/// Google Translate client
#[derive(Debug)]
pub struct GoogleTranslator {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
}

/// Translation request body
#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    #[serde(default)]
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

impl GoogleTranslator {
    /// Create a new Google client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_GOOGLE_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/language/translate/v2", base)
    }
}

#[async_trait]
impl TextTranslator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = GoogleRequest {
            q: text,
            target: target_language,
            format: "text",
        };

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response
            .json::<GoogleResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let translation = body
            .data
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("no translations returned".to_string()))?;

        if let Some(source) = &translation.detected_source_language {
            debug!("Google detected source language '{}' for target '{}'", source, target_language);
        }

        Ok(translation.translated_text)
    }
}
