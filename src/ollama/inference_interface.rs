use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure outcomes of a single inference call. The `Display` text is what the
/// user sees in place of a reply.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The server answered but reported an application-level error.
    #[error("Ollama Error: {0}")]
    Server(String),

    /// Connection refused, DNS failure, timeout, non-2xx status or an
    /// undecodable body.
    #[error("Connection Error: {0}")]
    Transport(String),

    /// The body parsed but carried neither `response` nor `error`.
    #[error("Unexpected response format: {0}")]
    MalformedResponse(Value),
}

pub type InferenceResult = Result<String, InferenceError>;

/// Collapse an outcome into the text shown as the assistant reply.
pub fn reply_text(result: InferenceResult) -> String {
    match result {
        Ok(text) => text,
        Err(e) => e.to_string(),
    }
}

/// A backend that turns one prompt into one complete (non-streamed) reply.
/// Implementations must not fail past this boundary: every failure is an
/// `InferenceError`.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> InferenceResult;

    /// Model identifier shown in the page chrome.
    fn model(&self) -> &str;
}
