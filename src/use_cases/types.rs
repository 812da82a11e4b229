// Use-case level inputs/outputs for the host loop and the peer mirror.

use crate::domain::{ControlFlags, PeerId, PlayerRecord, Rosters, Snapshot};
use crate::use_cases::agent::AgentCommand;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not started yet, or emptied out after a match.
    Lobby,
    /// Started, waiting for the first registered player.
    Countdown,
    Running,
    GameOver,
    /// Game over and at least one ready flag has been toggled.
    ReadyCheck,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Lobby => "lobby",
            SessionPhase::Countdown => "countdown",
            SessionPhase::Running => "running",
            SessionPhase::GameOver => "game_over",
            SessionPhase::ReadyCheck => "ready_check",
        }
    }

    pub fn is_over(self) -> bool {
        matches!(self, SessionPhase::GameOver | SessionPhase::ReadyCheck)
    }
}

/// Peer -> host messages, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerRequest {
    InitialDataRequest,
    PauseClicked,
    TeamUpdate(Rosters),
    SetPlayer(PlayerRecord),
    RemovePlayer(PlayerRecord),
    UsedColor { color: String, index: usize },
    UserInput { id: PeerId, flags: ControlFlags },
    PlayerReady(PlayerRecord),
}

impl PeerRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            PeerRequest::InitialDataRequest => "initial_data_request",
            PeerRequest::PauseClicked => "pause clicked",
            PeerRequest::TeamUpdate(_) => "team_update",
            PeerRequest::SetPlayer(_) => "set_gameInstance_player",
            PeerRequest::RemovePlayer(_) => "remove_gameInstance_player",
            PeerRequest::UsedColor { .. } => "client used color",
            PeerRequest::UserInput { .. } => "userInput",
            PeerRequest::PlayerReady(_) => "playerReady",
        }
    }
}

/// Host -> peer messages, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotice {
    InitialData {
        rosters: Rosters,
        paused: bool,
        available_colors: Vec<String>,
    },
    StartRejected,
    TeamUpdate(Rosters),
    ColorUsed { color: String, index: usize },
    ColorAvailable { color: String },
    PlayerReady(PlayerRecord),
    GameState(Snapshot),
    GameStarted,
    GameRestarting,
    GameOver { players: BTreeMap<PeerId, PlayerRecord> },
    ShowGameModal,
    PlayerLeft { id: PeerId },
}

/// One outbound connection as seen by the session.
///
/// Notices are encoded once per broadcast and the resulting frame is cloned into every link.
pub trait PeerLink: Send + 'static {
    type Frame: Clone + Send;

    fn encode(notice: &HostNotice) -> Option<Self::Frame>;

    /// Queues the frame. Returns false if the link is closed or its queue is full.
    fn send(&self, frame: Self::Frame) -> bool;

    /// Distinguishes successive connections that reuse a peer id.
    fn conn_id(&self) -> u64;

    /// Called on the old link when a newer connection takes over its peer id.
    fn replaced(&self) {}

    /// Called when a notice that must not be skipped could not be queued. The link should
    /// close so its peer goes through disconnect cleanup.
    fn lagged(&self) {}
}

/// Everything the host task reacts to besides its own timer.
#[derive(Debug)]
pub enum HostEvent<L> {
    Connected { peer_id: PeerId, link: L },
    Request { peer_id: PeerId, request: PeerRequest },
    Disconnected { peer_id: PeerId, conn_id: u64 },
    Agent(AgentCommand),
}

/// Read-only summary published for the HTTP lobby endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyStatus {
    pub lobby_code: String,
    pub phase: SessionPhase,
    pub players: usize,
    pub connections: usize,
    pub paused: bool,
}
