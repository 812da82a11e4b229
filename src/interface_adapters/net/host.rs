// Host side of the peer transport: one WebSocket per remote peer, feeding the host task.

use super::{LOG_THROTTLE, LoopControl, MAX_INVALID_JSON, NetError, should_log};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::conn_id;
use crate::use_cases::{HostEvent, HostNotice, PeerLink, PeerRequest};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::{sync::Arc, time::Instant};
use tokio::sync::{Notify, mpsc};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug, serde::Deserialize)]
pub struct ConnectQuery {
    // Lobby code the peer was given; must match the host's.
    #[serde(default)]
    lobby: Option<String>,
    #[serde(default)]
    peer_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Outbound half of one peer socket, as held by the session.
#[derive(Debug, Clone)]
pub struct ChannelLink {
    conn_id: u64,
    tx: mpsc::Sender<Utf8Bytes>,
    replaced: Arc<Notify>,
    lagged: Arc<Notify>,
}

impl PeerLink for ChannelLink {
    type Frame = Utf8Bytes;

    fn encode(notice: &HostNotice) -> Option<Utf8Bytes> {
        let msg = ServerMessage::from(notice);
        match serde_json::to_string(&msg) {
            Ok(txt) => Some(Utf8Bytes::from(txt)),
            Err(e) => {
                error!(error = %e, "failed to serialize host notice");
                None
            }
        }
    }

    fn send(&self, frame: Utf8Bytes) -> bool {
        self.tx.try_send(frame).is_ok()
    }

    fn conn_id(&self) -> u64 {
        self.conn_id
    }

    fn replaced(&self) {
        // Stores a permit, so the socket task sees it even if it is busy right now.
        self.replaced.notify_one();
    }

    fn lagged(&self) {
        self.lagged.notify_one();
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    if query.lobby.as_deref() != Some(&*state.lobby_code) {
        // Keep not-found responses consistent with the JSON error schema.
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "lobby not found".to_string(),
            }),
        )
            .into_response();
    }

    let Some(peer_id) = query
        .peer_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "peer_id is required".to_string(),
            }),
        )
            .into_response();
    };
    let display_name = query.name.unwrap_or_default();

    ws.on_upgrade(move |socket| {
        // Separate connection id for telling apart reconnects under the same peer id.
        let conn_id = conn_id();
        let span = info_span!("conn", conn_id, peer_id = %peer_id);
        handle_socket(socket, state, peer_id, display_name, conn_id).instrument(span)
    })
}

struct ConnCtx {
    pub peer_id: String,
    pub conn_id: u64,
    pub events_tx: mpsc::Sender<HostEvent<ChannelLink>>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<AppState>,
    peer_id: String,
    display_name: String,
    conn_id: u64,
) {
    let (out_tx, out_rx) = mpsc::channel::<Utf8Bytes>(state.outbound_capacity);
    let signals = LinkSignals::default();
    let link = ChannelLink {
        conn_id,
        tx: out_tx,
        replaced: signals.replaced.clone(),
        lagged: signals.lagged.clone(),
    };

    // Register before reading anything so the first request finds its connection.
    if state
        .events_tx
        .send(HostEvent::Connected {
            peer_id: peer_id.clone(),
            link,
        })
        .await
        .is_err()
    {
        warn!("host task gone; refusing connection");
        let _ = send_close_with_reason(&mut socket, close_code::AWAY, "host closed").await;
        return;
    }
    info!(display_name = %display_name, "client connected");

    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    let mut ctx = ConnCtx {
        peer_id,
        conn_id,
        events_tx: state.events_tx.clone(),
        msgs_in: 0,
        msgs_out: 0,
        bytes_in: 0,
        bytes_out: 0,
        invalid_json: 0,
        last_input_full_log: now,
        last_invalid_log: now,
        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx, out_rx, signals).await {
        warn!(error = ?e, "client loop exited with error");
    }

    disconnect_cleanup(&ctx).await;
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

// Close requests the host task raises on a link.
#[derive(Debug, Default)]
struct LinkSignals {
    replaced: Arc<Notify>,
    lagged: Arc<Notify>,
}

async fn run_client_loop(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
    mut out_rx: mpsc::Receiver<Utf8Bytes>,
    signals: LinkSignals,
) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // The replacement signal must win over the closed outbound queue it precedes.
            biased;

            _ = signals.replaced.notified() => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "connection replaced".into(),
                });
                info!("connection replaced by newer session");
                true
            }

            _ = signals.lagged.notified() => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: "outbound queue full".into(),
                });
                warn!("peer fell behind; closing");
                true
            }

            outbound = out_rx.recv() => {
                match outbound {
                    Some(frame) => matches!(
                        forward_frame(frame, socket, ctx).await,
                        LoopControl::Disconnect
                    ),
                    None => {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::AWAY,
                            reason: "host closed".into(),
                        });
                        true
                    }
                }
            }

            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(msg) => forward_request(ctx, PeerRequest::from(msg)).await,
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_request(ctx: &mut ConnCtx, request: PeerRequest) -> Result<LoopControl, NetError> {
    // Inputs are superseded by the next one; everything else must arrive in order.
    let droppable = matches!(request, PeerRequest::UserInput { .. });
    let event = HostEvent::Request {
        peer_id: ctx.peer_id.clone(),
        request,
    };

    if droppable {
        return match ctx.events_tx.try_send(event) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(mpsc::error::TrySendError::Full(_)) => {
                if should_log(&mut ctx.last_input_full_log) {
                    warn!("host event queue full; dropping input");
                }
                Ok(LoopControl::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InboundClosed),
        };
    }

    ctx.events_tx
        .send(event)
        .await
        .map_err(|_| NetError::InboundClosed)?;
    Ok(LoopControl::Continue)
}

async fn forward_frame(frame: Utf8Bytes, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let bytes_len = frame.len();
    match socket.send(Message::Text(frame)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect follows immediately.
            warn!(error = ?err, "failed to send host notice");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    // A stale conn_id is ignored by the host, so a replaced socket cannot evict its successor.
    if ctx
        .events_tx
        .send(HostEvent::Disconnected {
            peer_id: ctx.peer_id.clone(),
            conn_id: ctx.conn_id,
        })
        .await
        .is_err()
    {
        debug!("host task gone before disconnect");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("client disconnected");
}
