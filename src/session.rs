use thiserror::Error;
use tracing::{debug, warn};

use crate::ollama::{reply_text, InferenceBackend};
use crate::transcript::{Transcript, TranscriptEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Message is empty")]
    Empty,
}

/// Input check applied where text enters from the page. Blank submissions
/// never reach `run_turn`; anything else is forwarded exactly as typed.
pub fn validate_prompt(raw: &str) -> Result<&str, PromptError> {
    if raw.trim().is_empty() {
        return Err(PromptError::Empty);
    }
    Ok(raw)
}

/// One user turn: record the prompt, ask the backend, record the reply.
///
/// The transcript is owned by the caller and handed back afterwards. Backend
/// failures come back as assistant text, so this never fails.
pub async fn run_turn(
    mut transcript: Transcript,
    backend: &dyn InferenceBackend,
    prompt: &str,
) -> Transcript {
    transcript.append(TranscriptEntry::user(prompt));

    let result = backend.generate(prompt).await;
    match &result {
        Ok(text) => debug!("Reply received ({} chars)", text.len()),
        Err(e) => warn!("Inference failed: {}", e),
    }

    transcript.append(TranscriptEntry::assistant(reply_text(result)));
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::{InferenceError, OllamaClient};
    use crate::test_support::{spawn_mock_ollama, ScriptedBackend};
    use crate::transcript::Role;
    use axum::{routing::post, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn blank_prompts_are_rejected() {
        assert_eq!(validate_prompt(""), Err(PromptError::Empty));
        assert_eq!(validate_prompt("   \n\t"), Err(PromptError::Empty));
        assert_eq!(validate_prompt(" hi "), Ok(" hi "));
    }

    #[tokio::test]
    async fn hello_turn_records_both_sides() {
        let backend = ScriptedBackend::new(vec![Ok("hi there".to_string())]);

        let transcript = run_turn(Transcript::new(), &backend, "hello").await;

        assert_eq!(
            transcript.all(),
            &[
                TranscriptEntry::user("hello"),
                TranscriptEntry::assistant("hi there"),
            ]
        );
        assert_eq!(backend.prompts(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn n_turns_alternate_starting_with_user() {
        let backend = ScriptedBackend::default();
        let mut transcript = Transcript::new();

        for i in 0..4 {
            transcript = run_turn(transcript, &backend, &format!("prompt {}", i)).await;
        }

        assert_eq!(transcript.len(), 8);
        for (i, entry) in transcript.all().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(entry.role(), expected);
            assert_eq!(entry.text(), format!("prompt {}", i / 2));
        }
    }

    #[tokio::test]
    async fn failures_become_assistant_entries() {
        let backend = ScriptedBackend::new(vec![
            Err(InferenceError::Server("model not found".into())),
            Err(InferenceError::MalformedResponse(json!({"foo": "bar"}))),
        ]);

        let transcript = run_turn(Transcript::new(), &backend, "a").await;
        let transcript = run_turn(transcript, &backend, "b").await;

        let texts: Vec<&str> = transcript.all().iter().map(|e| e.text()).collect();
        assert_eq!(texts[1], "Ollama Error: model not found");
        assert!(texts[3].starts_with("Unexpected response format: "));
        assert!(texts[3].contains("foo"));
    }

    #[tokio::test]
    async fn empty_prompt_is_passed_through() {
        let backend = ScriptedBackend::new(vec![Ok("?".to_string())]);

        let transcript = run_turn(Transcript::new(), &backend, "").await;

        assert_eq!(backend.prompts(), vec![String::new()]);
        assert_eq!(transcript.all()[0], TranscriptEntry::user(""));
    }

    #[tokio::test]
    async fn ping_against_stalled_server_ends_with_connection_error() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"response": "pong"}))
            }),
        );
        let endpoint = spawn_mock_ollama(app).await;
        let client =
            OllamaClient::new(endpoint, "llama3.2".to_string(), Duration::from_millis(200)).unwrap();

        let transcript = run_turn(Transcript::new(), &client, "ping").await;

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.all()[0], TranscriptEntry::user("ping"));
        let last = transcript.last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert!(last.text().starts_with("Connection Error:"), "{}", last.text());
    }
}
