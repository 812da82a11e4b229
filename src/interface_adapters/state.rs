use crate::interface_adapters::net::ChannelLink;
use crate::use_cases::{AgentView, HostEvent, LobbyStatus};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub struct AppState {
    // Shareable lobby code; equal to the host's own peer id.
    pub lobby_code: Arc<str>,
    // Every socket event flows into the single host task.
    pub events_tx: mpsc::Sender<HostEvent<ChannelLink>>,
    // Summary published by the host task after each event.
    pub status_rx: watch::Receiver<LobbyStatus>,
    // Reduced per-tick view for the agent bridge.
    pub agent_rx: watch::Receiver<Option<AgentView>>,
    // Per-connection outbound queue size.
    pub outbound_capacity: usize,
}
