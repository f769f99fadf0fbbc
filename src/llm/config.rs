//! Gemini configuration parsed from environment variables.

use std::fmt;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    /// Whole-request timeout. `None` waits for the transport to settle.
    pub request_secs: Option<u64>,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: None, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl GeminiConfig {
    /// Config with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            timeouts: LlmTimeouts::default(),
        }
    }

    /// Build typed Gemini config from environment variables.
    ///
    /// - `GEMINI_API_KEY`: not validated; an absent key is sent as empty
    /// - `GEMINI_MODEL`: default `gemini-1.5-pro-latest`
    /// - `GEMINI_BASE_URL`: default public `v1beta` endpoint
    /// - `GEMINI_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `GEMINI_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GeminiConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY not set; requests will be rejected by the service");
        }

        let model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let base_url = normalize_base_url(lookup("GEMINI_BASE_URL").as_deref());
        let timeouts = LlmTimeouts {
            request_secs: lookup("GEMINI_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()),
            connect_secs: lookup("GEMINI_CONNECT_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Self { api_key, model, base_url, timeouts }
    }

    /// Override the base URL, trimming any trailing `/`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(Some(base_url));
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// `<base>/models/<model>:generateContent`, without the key.
    #[must_use]
    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

fn normalize_base_url(raw: Option<&str>) -> String {
    raw.filter(|u| !u.trim().is_empty())
        .unwrap_or(DEFAULT_GEMINI_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
