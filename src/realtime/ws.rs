//! WebSocket Endpoint
//! Mission: Stream refresh events to clients by joined room

use crate::realtime::hub::Notifier;
use crate::routes::AppState;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::Response,
};
use serde_json::json;
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.notifier.clone()))
}

async fn handle_socket(mut socket: WebSocket, notifier: Notifier) {
    let mut rx = notifier.subscribe();
    let mut rooms: HashSet<String> = HashSet::new();

    info!("🔌 WebSocket client connected");

    loop {
        tokio::select! {
            // Deliver refresh events for rooms this client joined
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if !should_forward(&rooms, &event.channel) {
                            continue;
                        }
                        let msg = serde_json::to_string(&event)
                            .unwrap_or_else(|e| {
                                warn!("Failed to serialize ws event: {}", e);
                                "{}".to_string()
                            });
                        if socket.send(Message::Text(msg)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            // Handle incoming messages from client
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = process_client_message(&text, &mut rooms) {
                            if socket.send(Message::Text(reply)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    info!("🔌 WebSocket client disconnected");
}

/// A broadcast event reaches a client only through a room it has joined
fn should_forward(rooms: &HashSet<String>, channel: &str) -> bool {
    rooms.contains(channel)
}

/// Handle one inbound text frame, updating the joined-room set; returns
/// an optional reply frame
fn process_client_message(text: &str, rooms: &mut HashSet<String>) -> Option<String> {
    // Legacy plain text ping
    if text == "ping" {
        return Some("pong".to_string());
    }

    let value: serde_json::Value = serde_json::from_str(text).ok()?;

    match value.get("type").and_then(|t| t.as_str()) {
        Some("join-room") => {
            if let Some(room) = value.get("room").and_then(|r| r.as_str()) {
                debug!("Client joined room: {}", room);
                rooms.insert(room.to_string());
            }
            None
        }
        Some("leave-room") => {
            if let Some(room) = value.get("room").and_then(|r| r.as_str()) {
                debug!("Client left room: {}", room);
                rooms.remove(room);
            }
            None
        }
        Some("ping") => {
            // Echo back pong with the same timestamp for latency calculation
            let timestamp = value
                .get("data")
                .and_then(|d| d.get("timestamp"))
                .and_then(|t| t.as_i64())
                .unwrap_or(0);
            Some(
                json!({
                    "type": "pong",
                    "data": { "timestamp": timestamp }
                })
                .to_string(),
            )
        }
        _ => None,
    }
}
