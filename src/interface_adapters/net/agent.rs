// Agent bridge: streams the host-local player's reduced view and accepts key commands.

use super::{LOG_THROTTLE, should_log};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::conn_id;
use crate::use_cases::{AgentCommand, AgentView, HostEvent};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentMessage {
    #[serde(rename = "gameState")]
    GameState {
        player: AgentPlayerDto,
        enemies: Vec<AgentEnemyDto>,
        coins: Vec<AgentCoinDto>,
        paused: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentPlayerDto {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub score: u32,
    pub lives: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentEnemyDto {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentCoinDto {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize)]
pub struct AgentAction {
    pub action: String,
}

impl From<&AgentView> for AgentMessage {
    fn from(view: &AgentView) -> Self {
        AgentMessage::GameState {
            player: AgentPlayerDto {
                x: view.player.x,
                y: view.player.y,
                dx: view.player.dx,
                dy: view.player.dy,
                score: view.player.score,
                lives: view.player.lives,
            },
            enemies: view
                .enemies
                .iter()
                .map(|e| AgentEnemyDto {
                    x: e.x,
                    y: e.y,
                    dx: e.dx,
                    dy: e.dy,
                })
                .collect(),
            coins: view
                .coins
                .iter()
                .map(|c| AgentCoinDto { x: c.x, y: c.y })
                .collect(),
            paused: view.paused,
        }
    }
}

/// Decodes one agent frame into a key command.
pub fn parse_action(text: &str) -> Result<AgentCommand, String> {
    let action: AgentAction = serde_json::from_str(text).map_err(|e| e.to_string())?;
    action.action.parse()
}

pub async fn agent_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let span = info_span!("agent", conn_id = conn_id());
        handle_agent(socket, state).instrument(span)
    })
}

async fn handle_agent(mut socket: WebSocket, state: Arc<AppState>) {
    info!("agent connected");
    let mut view_rx = state.agent_rx.clone();
    let mut last_invalid_log = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);

    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    debug!("agent view channel closed");
                    break;
                }
                // Clone out of the watch borrow before awaiting.
                let view = view_rx.borrow_and_update().clone();
                let Some(view) = view else {
                    continue;
                };
                let txt = match serde_json::to_string(&AgentMessage::from(&view)) {
                    Ok(txt) => txt,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize agent view");
                        continue;
                    }
                };
                if socket.send(Message::Text(txt.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match parse_action(text.as_str()) {
                        Ok(command) => {
                            if state.events_tx.send(HostEvent::Agent(command)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            if should_log(&mut last_invalid_log) {
                                warn!(error = %e, "invalid agent action");
                            }
                        }
                    },
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.close().await;
    info!("agent disconnected");
}
