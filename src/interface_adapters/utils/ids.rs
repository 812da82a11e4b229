use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Id for one accepted socket. Only has to tell apart connections within this host process,
/// including several that reuse the same peer id.
pub fn conn_id() -> u64 {
    NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed)
}

/// Fresh peer id. The host's own peer id doubles as the shareable lobby code.
pub fn new_peer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
