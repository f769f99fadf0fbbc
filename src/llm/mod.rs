//! LLM — Gemini adapter for the cricket assistant.
//!
//! DESIGN
//! ======
//! One provider, one call shape: a single-turn `generateContent` request.
//! Configuration is built once (`GeminiConfig::from_env`) and handed to
//! `GeminiClient`; nothing here reads the environment at call time.
//! Callers depend on the `GenerateContent` trait so tests can swap in a
//! mock service.

pub mod config;
pub mod gemini;
pub mod types;

pub use config::GeminiConfig;
pub use gemini::GeminiClient;
pub use types::{GenerateContent, GenerateContentRequest, GenerateContentResponse, LlmError};
