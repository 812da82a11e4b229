// Peer side of the transport: a tokio-tungstenite client connected to the host.

use super::{LOG_THROTTLE, NetError, should_log};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::use_cases::{HostNotice, PeerRequest};

use futures::{SinkExt, StreamExt};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Notice(HostNotice),
    // Terminal: the host socket closed or failed.
    HostLost,
}

/// Live connection to a host. Dropping it closes the socket.
#[derive(Debug)]
pub struct PeerConnection {
    outbound: mpsc::Sender<String>,
    events: mpsc::Receiver<PeerEvent>,
}

impl PeerConnection {
    pub async fn send(&self, request: &PeerRequest) -> Result<(), NetError> {
        let txt =
            serde_json::to_string(&ClientMessage::from(request)).map_err(NetError::Serialization)?;
        self.outbound
            .send(txt)
            .await
            .map_err(|_| NetError::HostClosed)
    }

    /// Next host notice, or `HostLost` once. `None` after that.
    pub async fn next_event(&mut self) -> Option<PeerEvent> {
        self.events.recv().await
    }
}

/// Query values are percent-encoded outside the unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

pub fn connect_url(host_url: &str, lobby_code: &str, peer_id: &str, name: &str) -> String {
    format!(
        "{}/ws?lobby={}&peer_id={}&name={}",
        host_url.trim_end_matches('/'),
        encode_query_value(lobby_code),
        encode_query_value(peer_id),
        encode_query_value(name),
    )
}

pub async fn connect(
    host_url: &str,
    lobby_code: &str,
    peer_id: &str,
    name: &str,
    capacity: usize,
) -> Result<PeerConnection, NetError> {
    let url = connect_url(host_url, lobby_code, peer_id, name);
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .map_err(NetError::Connect)?;
    info!(lobby = %lobby_code, peer_id = %peer_id, "connected to host");

    let (mut write, mut read) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(capacity);
    let (event_tx, event_rx) = mpsc::channel::<PeerEvent>(capacity);

    tokio::spawn(async move {
        while let Some(txt) = out_rx.recv().await {
            if let Err(e) = write.send(Message::Text(txt.into())).await {
                debug!(error = %e, "failed to send to host");
                break;
            }
        }
        let _ = write.close().await;
    });

    tokio::spawn(async move {
        let mut last_invalid_log = Instant::now()
            .checked_sub(LOG_THROTTLE)
            .unwrap_or_else(Instant::now);

        while let Some(incoming) = read.next().await {
            match incoming {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(text.as_str())
                {
                    Ok(msg) => {
                        if event_tx.send(PeerEvent::Notice(msg.into())).await.is_err() {
                            // Nobody is listening any more.
                            return;
                        }
                    }
                    Err(e) => {
                        if should_log(&mut last_invalid_log) {
                            warn!(error = %e, "failed to parse host message");
                        }
                    }
                },
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "host closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "host socket error");
                    break;
                }
            }
        }

        let _ = event_tx.send(PeerEvent::HostLost).await;
    });

    Ok(PeerConnection {
        outbound: out_tx,
        events: event_rx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_name_has_spaces_then_url_is_percent_encoded() {
        let url = connect_url("ws://127.0.0.1:3001/", "abc-1", "p1", "Ann Lee&co");
        assert_eq!(
            url,
            "ws://127.0.0.1:3001/ws?lobby=abc-1&peer_id=p1&name=Ann%20Lee%26co"
        );
    }
}
