// Use cases layer: session state machine, lobby coordination and protocol dispatch.

pub mod agent;
pub mod game;
pub mod host;
pub mod lobby;
pub mod mirror;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use agent::{AgentCommand, AgentView};
pub use host::Host;
pub use lobby::LobbyCoordinator;
pub use mirror::{MirrorView, PeerMirror};
pub use session::{GameSession, SessionTiming};
pub use types::{HostEvent, HostNotice, LobbyStatus, PeerLink, PeerRequest, SessionPhase};
