use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt};
use serde_json::{json, Value};
use std::fmt::Display;
use tracing::{debug, warn};

use crate::render::render_transcript;
use crate::session::{run_turn, validate_prompt};
use crate::state::AppState;
use crate::transcript::Transcript;

/// Per-connection session. Owned by the socket task; never shared.
#[derive(Debug)]
pub struct ClientSession {
    pub client_uid: String,
    pub transcript: Transcript,
}

impl ClientSession {
    pub fn new(client_uid: String) -> Self {
        Self {
            client_uid,
            transcript: Transcript::new(),
        }
    }
}

pub async fn send_json<S>(sender: &mut S, value: Value) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    sender
        .send(Message::Text(value.to_string()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))
}

pub fn history_message(transcript: &Transcript) -> Value {
    json!({
        "type": "history-data",
        "messages": render_transcript(transcript)
    })
}

pub async fn handle_message<S>(
    state: &AppState,
    session: &mut ClientSession,
    text: &str,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let msg: Value = serde_json::from_str(text)?;
    let msg_type = msg.get("type").and_then(|v| v.as_str());

    match msg_type {
        Some("text-input") => {
            handle_text_input(state, session, &msg, sender).await?;
        }
        Some("fetch-history") => {
            send_json(sender, history_message(&session.transcript)).await?;
        }
        Some("clear-history") => {
            debug!("Clearing transcript for {}", session.client_uid);
            session.transcript = Transcript::new();
            send_json(sender, history_message(&session.transcript)).await?;
        }
        _ => {
            warn!("Unknown message type: {:?}", msg_type);
        }
    }

    Ok(())
}

async fn handle_text_input<S>(
    state: &AppState,
    session: &mut ClientSession,
    msg: &Value,
    sender: &mut S,
) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let raw = msg.get("text").and_then(|v| v.as_str()).unwrap_or("");
    let prompt = match validate_prompt(raw) {
        Ok(prompt) => prompt,
        Err(e) => {
            return send_json(sender, json!({"type": "error", "message": e.to_string()})).await;
        }
    };

    send_json(sender, json!({"type": "control", "text": "thinking-start"})).await?;

    let transcript = std::mem::take(&mut session.transcript);
    session.transcript = run_turn(transcript, state.backend.as_ref(), prompt).await;
    state.record_turn(&session.client_uid);

    send_json(sender, history_message(&session.transcript)).await?;
    send_json(sender, json!({"type": "control", "text": "thinking-end"})).await?;

    Ok(())
}
