//! Assistant gateway — one user message in, one display string out.
//!
//! DESIGN
//! ======
//! Each turn sends a fixed persona preamble followed by the raw user text
//! as a single prompt. Prior turns are not replayed.
//!
//! Interpretation is split in two: `interpret`/`classify` are pure
//! functions producing an `Outcome`, and `Outcome`'s `Display` renders the
//! text the transcript shows. The gateway never returns an error; every
//! failure becomes a renderable `FailureKind`.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::types::{GenerateContent, GenerateContentRequest, GenerateContentResponse, LlmError};

pub const PERSONA_PREAMBLE: &str = "You are a cricket expert assistant and a true cricket geek. \
Chat with the user like a seasoned fan with passion for the game and deep insights into IPL history and stats. \
Answer in a friendly and engaging tone. User: ";

pub const FALLBACK_REPLY: &str = "Sorry, I didn't understand that. Could you rephrase?";

const UNKNOWN_ERROR: &str = "unknown error";

/// Preamble and user text as one prompt string.
#[must_use]
pub fn combined_prompt(user_text: &str) -> String {
    format!("{PERSONA_PREAMBLE}{user_text}")
}

// =============================================================================
// OUTCOME
// =============================================================================

/// What a well-formed response body means for the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// First candidate's first part text.
    Text(String),
    /// Body carried an `error` object instead of candidates.
    ModelError(String),
    /// Neither text nor error present.
    Fallback,
}

/// Why a call produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport error whose body carried `error.message`.
    Api(String),
    /// Transport error without a parseable message.
    Transport(String),
    /// Anything else (malformed success body, client construction, panics).
    Unexpected(String),
}

/// Settled result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(Reply),
    Failure(FailureKind),
}

impl Outcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::ModelError(message) => write!(f, "AI Error: {message}"),
            Self::Fallback => f.write_str(FALLBACK_REPLY),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(message) | Self::Transport(message) => write!(f, "API Error: {message}"),
            Self::Unexpected(description) => write!(f, "Error: {description}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(reply) => fmt::Display::fmt(reply, f),
            Self::Failure(kind) => fmt::Display::fmt(kind, f),
        }
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Map a response body to a [`Reply`].
#[must_use]
pub fn interpret(response: &GenerateContentResponse) -> Reply {
    if let Some(text) = response.first_text() {
        return Reply::Text(text.to_string());
    }
    match &response.error {
        Some(error) => Reply::ModelError(
            error
                .message
                .clone()
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        ),
        None => Reply::Fallback,
    }
}

/// Map a failed call to a [`FailureKind`].
#[must_use]
pub fn classify(error: &LlmError) -> FailureKind {
    match error {
        LlmError::ApiResponse { status, .. } => match error.body_message() {
            Some(message) => FailureKind::Api(message),
            None => FailureKind::Transport(format!("Request failed with status code {status}")),
        },
        LlmError::ApiRequest(description) => FailureKind::Transport(description.clone()),
        LlmError::ApiParse(_) | LlmError::HttpClientBuild(_) => FailureKind::Unexpected(error.to_string()),
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

#[derive(Clone)]
pub struct AssistantGateway {
    llm: Arc<dyn GenerateContent>,
}

impl AssistantGateway {
    #[must_use]
    pub fn new(llm: Arc<dyn GenerateContent>) -> Self {
        Self { llm }
    }

    /// Run one turn against the service. Never fails.
    pub async fn respond(&self, user_text: &str) -> Outcome {
        let request = GenerateContentRequest::user_prompt(combined_prompt(user_text));
        info!(prompt_len = user_text.len(), "assistant: sending turn");

        match self.llm.generate(&request).await {
            Ok(response) => {
                let reply = interpret(&response);
                match &reply {
                    Reply::Text(text) => info!(reply_len = text.len(), "assistant: reply received"),
                    Reply::ModelError(message) => warn!(%message, "assistant: service returned error object"),
                    Reply::Fallback => warn!("assistant: response had no candidates"),
                }
                Outcome::Reply(reply)
            }
            Err(e) => {
                warn!(error = %e, "assistant: call failed");
                Outcome::Failure(classify(&e))
            }
        }
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
