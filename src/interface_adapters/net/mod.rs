// Network adapters: the host's peer sockets, the agent bridge, and the peer-side client.

pub mod agent;
pub mod host;
pub mod peer;

pub use agent::agent_handler;
pub use host::{ChannelLink, ws_handler};
pub use peer::{PeerConnection, PeerEvent, connect};

use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    Serialization(serde_json::Error),
    // The host side of a peer connection went away.
    HostClosed,
    Connect(tokio_tungstenite::tungstenite::Error),
    // The host task stopped accepting events.
    InboundClosed,
}

impl std::fmt::Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::Serialization(e) => write!(f, "serialization error: {e}"),
            NetError::HostClosed => f.write_str("host closed the connection"),
            NetError::Connect(e) => write!(f, "failed to connect to host: {e}"),
            NetError::InboundClosed => f.write_str("host task is gone"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
