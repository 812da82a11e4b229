// Domain-level errors for session and lobby workflows.

use crate::domain::entities::PeerId;
use crate::domain::tuning::InvalidConfig;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    // Start/pause requested while no player is registered.
    NoPlayers,
    // Tuning change attempted while the match is live.
    MatchInProgress,
    UnknownPlayer(PeerId),
    InvalidConfig(InvalidConfig),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoPlayers => f.write_str("start game with 0 players"),
            SessionError::MatchInProgress => f.write_str("match in progress"),
            SessionError::UnknownPlayer(id) => write!(f, "unknown player `{id}`"),
            SessionError::InvalidConfig(e) => write!(f, "{e}"),
        }
    }
}

impl From<InvalidConfig> for SessionError {
    fn from(e: InvalidConfig) -> Self {
        SessionError::InvalidConfig(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    // The one-shot join guard already fired for this player.
    AlreadyJoined,
    ColorUnavailable(String),
    UnknownPeer(PeerId),
}

impl fmt::Display for LobbyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LobbyError::AlreadyJoined => f.write_str("player already joined a team"),
            LobbyError::ColorUnavailable(color) => write!(f, "color `{color}` is not available"),
            LobbyError::UnknownPeer(id) => write!(f, "unknown peer `{id}`"),
        }
    }
}
