use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use super::inference_interface::{InferenceBackend, InferenceError, InferenceResult};
use crate::config::OllamaConfig;

/// Body of `POST /api/generate`. Built per call and dropped afterwards.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

impl<'a> InferenceRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            stream: false,
        }
    }
}

/// Non-streaming client for Ollama's generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(endpoint: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Initialized OllamaClient: model={}, endpoint={}", model, endpoint);

        Ok(Self {
            client,
            endpoint,
            model,
        })
    }

    pub fn from_config(config: &OllamaConfig) -> anyhow::Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn post(&self, request: &InferenceRequest<'_>) -> Result<Value, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn generate(&self, prompt: &str) -> InferenceResult {
        let request = InferenceRequest::new(&self.model, prompt);
        match self.post(&request).await {
            Ok(body) => interpret_body(body),
            Err(e) => Err(InferenceError::Transport(e.to_string())),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Classify a decoded response body. `response` wins over `error`; anything
/// else, including a non-object body, is malformed.
pub fn interpret_body(body: Value) -> InferenceResult {
    let Some(object) = body.as_object() else {
        return Err(InferenceError::MalformedResponse(body));
    };

    if let Some(response) = object.get("response") {
        return Ok(field_text(response));
    }
    if let Some(error) = object.get("error") {
        return Err(InferenceError::Server(field_text(error)));
    }

    Err(InferenceError::MalformedResponse(body))
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
