//! LLM types — Gemini `generateContent` wire shapes and errors.
//!
//! Only the subset of the Gemini schema the assistant reads is modeled.
//! Every response field is optional: the remote service may omit any of
//! them, and interpretation of a partial body belongs to the caller.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// A success response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// The `error.message` carried by a non-success response body, if the
    /// body is a structured Gemini error with a non-empty message.
    #[must_use]
    pub fn body_message(&self) -> Option<String> {
        match self {
            Self::ApiResponse { body, .. } => serde_json::from_str::<ErrorEnvelope>(body)
                .ok()?
                .error?
                .message
                .filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

// =============================================================================
// REQUEST
// =============================================================================

/// Body of a `models/<model>:generateContent` call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPart {
    pub text: String,
}

impl GenerateContentRequest {
    /// A single-turn request carrying one user-role text part.
    #[must_use]
    pub fn user_prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: text.into() }],
                role: "user".into(),
            }],
        }
    }

    /// Text of the first part of the first content entry.
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        self.contents
            .first()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Response from a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Structured error object Gemini embeds in error bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first content part. Empty text counts
    /// as absent.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}

// =============================================================================
// GENERATE CONTENT TRAIT
// =============================================================================

/// Async seam over the generative-language service. Enables mocking in tests.
#[async_trait::async_trait]
pub trait GenerateContent: Send + Sync {
    /// Send one `generateContent` request.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request cannot be sent, the service
    /// answers with a non-success status, or the body is malformed.
    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
