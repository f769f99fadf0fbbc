//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `models/<model>:generateContent`. The API key
//! travels in the `key` query parameter. Pure parsing in `parse_response`
//! for testability.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::config::GeminiConfig;
use super::types::{GenerateContent, GenerateContentRequest, GenerateContentResponse, LlmError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Build a client from `GEMINI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(GeminiConfig::from_env())
    }

    /// Return the configured model name (e.g. `"gemini-1.5-pro-latest"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<String, LlmError> {
        let url = self.config.generate_content_url();
        debug!(%url, model = %self.config.model, "gemini: POST generateContent");

        // The key rides in the URL, so strip it from transport errors.
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(LlmError::ApiResponse { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl GenerateContent for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse, LlmError> {
        let text = self.send(request).await?;
        parse_response(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<GenerateContentResponse, LlmError> {
    serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
