// Shared HTTP response types and the lobby info route.

use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct LobbyInfoResponse {
    pub lobby_code: String,
    pub phase: String,
    pub players: usize,
    pub connections: usize,
    pub paused: bool,
}

pub async fn lobby_info_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Clone out of the watch borrow right away.
    let status = state.status_rx.borrow().clone();
    Json(LobbyInfoResponse {
        lobby_code: status.lobby_code,
        phase: status.phase.as_str().to_string(),
        players: status.players,
        connections: status.connections,
        paused: status.paused,
    })
}
