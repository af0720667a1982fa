//! Completion port
//!
//! Defines the interface for the external completion service that turns an
//! article excerpt into question records. The service is unreliable by
//! assumption (it may fail or return malformed text), so its output is
//! never trusted without the validation step in the generation loop.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a completion request.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Service returned no choices")]
    EmptyResponse,
}

/// A single completion request: a fixed role-tagged message pair plus
/// sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction describing the question-generation task.
    pub system_prompt: String,
    /// User message: the delimited article excerpt.
    pub user_payload: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Gateway to the completion service.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Send one request and return the raw completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
