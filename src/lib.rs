//! Conversation core of the cricket assistant chat widget.
//!
//! `state` owns the transcript and the single-flight turn gate,
//! `services::assistant` turns one user message into one display string,
//! `services::conversation` wires the two together on the tokio runtime.

pub mod llm;
pub mod services;
pub mod state;
