//! Completion adapter: OpenAI-compatible chat completions client.

mod client;

pub use client::{DEFAULT_BASE_URL, OpenAiCompletionClient};
