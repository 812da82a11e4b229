// Protocol dispatcher: routes every peer request and host-local action into the session
// and the lobby coordinator.

use crate::domain::{Clock, ControlFlags, LobbyError, PeerId, Scheduler, SessionError, Team};
use crate::use_cases::agent::{AgentCommand, AgentView};
use crate::use_cases::lobby::LobbyCoordinator;
use crate::use_cases::session::GameSession;
use crate::use_cases::types::{HostEvent, HostNotice, LobbyStatus, PeerLink, PeerRequest};
use tracing::{debug, info, warn};

pub struct Host<C, S, L> {
    // The host's own peer id; shared with peers as the lobby code.
    lobby_code: PeerId,
    local_name: String,
    session: GameSession<C, S, L>,
    lobby: LobbyCoordinator,
}

impl<C, S, L> Host<C, S, L>
where
    C: Clock,
    S: Scheduler,
    L: PeerLink,
{
    pub fn new(lobby_code: PeerId, local_name: String, session: GameSession<C, S, L>) -> Self {
        let lobby = LobbyCoordinator::new(&session.config().player_colors);
        Self {
            lobby_code,
            local_name,
            session,
            lobby,
        }
    }

    pub fn handle_event(&mut self, event: HostEvent<L>) {
        match event {
            HostEvent::Connected { peer_id, link } => {
                let conn_id = link.conn_id();
                if let Some(old) = self.session.add_connection(peer_id.clone(), link) {
                    old.replaced();
                    info!(peer_id = %peer_id, conn_id, old_conn_id = old.conn_id(), "connection replaced");
                } else {
                    info!(peer_id = %peer_id, conn_id, "peer connected");
                }
            }
            HostEvent::Request { peer_id, request } => self.dispatch(&peer_id, request),
            HostEvent::Disconnected { peer_id, conn_id } => {
                self.lobby.disconnect(&mut self.session, &peer_id, conn_id);
            }
            HostEvent::Agent(command) => self.apply_agent_command(command),
        }
    }

    /// Handles one decoded request from `from` to completion before returning.
    pub fn dispatch(&mut self, from: &str, request: PeerRequest) {
        let kind = request.kind();
        debug!(peer_id = %from, kind, "peer request");
        match request {
            PeerRequest::InitialDataRequest => {
                let notice = self.lobby.initial_data(self.session.is_paused());
                self.session.send_to(from, &notice);
            }
            PeerRequest::PauseClicked => {
                if let Err(SessionError::NoPlayers) = self.session.toggle_pause() {
                    warn!(peer_id = %from, "start game with 0 players");
                    self.session.send_to(from, &HostNotice::StartRejected);
                }
            }
            PeerRequest::TeamUpdate(rosters) => self.lobby.adopt_rosters(&self.session, rosters),
            PeerRequest::SetPlayer(record) => {
                if record.id != from {
                    warn!(peer_id = %from, record_id = %record.id, kind, "record for another peer ignored");
                    return;
                }
                if let Err(e) = self.lobby.set_player(&mut self.session, &record) {
                    debug!(peer_id = %from, error = %e, kind, "player record not applied");
                }
            }
            PeerRequest::RemovePlayer(record) => {
                if record.id != from {
                    warn!(peer_id = %from, record_id = %record.id, kind, "record for another peer ignored");
                    return;
                }
                if let Err(e) = self.lobby.remove_player(&mut self.session, &record) {
                    debug!(peer_id = %from, error = %e, kind, "player record not applied");
                }
            }
            PeerRequest::UsedColor { color, index } => {
                debug!(peer_id = %from, color = %color, client_index = index, "color requested");
                if let Err(e) = self.lobby.claim_color(&self.session, from, &color) {
                    debug!(peer_id = %from, error = %e, "color stays with its holder");
                }
            }
            PeerRequest::UserInput { id, flags } => {
                if let Err(e) = self.session.set_controls(&id, flags) {
                    debug!(peer_id = %from, error = %e, "input ignored");
                }
            }
            PeerRequest::PlayerReady(record) => {
                if let Err(e) = self.lobby.toggle_ready(&mut self.session, &record.id) {
                    debug!(peer_id = %from, error = %e, "ready toggle ignored");
                }
            }
        }
    }

    pub fn on_timer(&mut self) {
        self.session.on_timer();
    }

    // ---- host-local participant ----

    pub fn join_local(&mut self, team: Team, color: &str) -> Result<(), LobbyError> {
        let id = self.lobby_code.clone();
        let name = self.local_name.clone();
        self.lobby
            .join_team(&mut self.session, &id, &name, team, color)
    }

    pub fn local_input(&mut self, flags: ControlFlags) -> Result<(), SessionError> {
        self.session.set_controls(&self.lobby_code, flags)
    }

    pub fn local_ready(&mut self) -> Result<bool, LobbyError> {
        let id = self.lobby_code.clone();
        self.lobby.toggle_ready(&mut self.session, &id)
    }

    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        self.session.toggle_pause()
    }

    /// Restart button: restarts regardless of ready flags.
    pub fn force_restart(&mut self) {
        info!(lobby = %self.lobby_code, "restart forced by host");
        self.session.broadcast(&HostNotice::GameRestarting);
        self.session.restart();
    }

    pub fn apply_agent_command(&mut self, command: AgentCommand) {
        match self.session.player_mut(&self.lobby_code) {
            Some(player) => command.apply(&mut player.controls),
            None => debug!(?command, "agent command ignored; local player not in match"),
        }
    }

    pub fn agent_view(&self) -> Option<AgentView> {
        AgentView::from_snapshot(&self.session.snapshot(), &self.lobby_code)
    }

    pub fn status(&self) -> LobbyStatus {
        LobbyStatus {
            lobby_code: self.lobby_code.clone(),
            phase: self.session.phase(),
            players: self.session.players().len(),
            connections: self.session.connection_count(),
            paused: self.session.is_paused(),
        }
    }

    pub fn lobby_code(&self) -> &str {
        &self.lobby_code
    }

    pub fn session(&self) -> &GameSession<C, S, L> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession<C, S, L> {
        &mut self.session
    }

    pub fn lobby(&self) -> &LobbyCoordinator {
        &self.lobby
    }
}
