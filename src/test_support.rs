//! Shared fixtures for unit tests: a throwaway Ollama stand-in served by axum
//! and a scripted in-process backend.

use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ollama::{InferenceBackend, InferenceResult};

/// Serve `app` on an ephemeral local port and return its generate URL.
pub async fn spawn_mock_ollama(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/generate", addr)
}

/// A generate URL on a port nothing is listening on.
pub async fn refused_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/generate", addr)
}

/// Backend that replays queued outcomes and records every prompt it saw.
/// Once the queue is drained it echoes the prompt back.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<InferenceResult>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<InferenceResult>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> InferenceResult {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(prompt.to_string()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
