use axum::extract::ws::WebSocket;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::StreamExt;
use serde_json::json;
use tracing::{error, info};

use crate::handlers::{self, history_message, send_json, ClientSession};
use crate::state::AppState;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.register_client();
    info!("New WebSocket connection: {}", client_uid);

    let mut session = ClientSession::new(client_uid.clone());
    let (mut sender, mut receiver) = socket.split();

    let initial_messages = vec![
        json!({
            "type": "session-established",
            "client_uid": client_uid,
            "model": state.backend.model()
        }),
        history_message(&session.transcript),
    ];

    for msg in initial_messages {
        if let Err(e) = send_json(&mut sender, msg).await {
            error!("Failed to send initial message: {}", e);
            state.unregister_client(&client_uid);
            return;
        }
    }

    // Frames are handled one at a time, so a session never has two turns in flight.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handlers::handle_message(&state, &mut session, &text, &mut sender).await {
                    error!("Error handling message: {}", e);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    state.unregister_client(&client_uid);
    info!(
        "Cleaned up client {} ({} transcript entries dropped)",
        client_uid,
        session.transcript.len()
    );
}
