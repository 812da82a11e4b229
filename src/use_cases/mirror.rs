// Peer-side read-only mirror of the host's session, plus the client join flow.

use crate::domain::{
    ControlFlags, GameConfig, LobbyError, PeerId, Player, PlayerRecord, RosterEntry, Rosters,
    Snapshot, Team,
};
use crate::use_cases::types::{HostNotice, PeerRequest};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What the peer would be showing.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorView {
    /// Not connected to any host.
    PreLobby,
    Lobby,
    Game,
    /// Paused or between matches.
    GameModal,
    GameOver { players: BTreeMap<PeerId, PlayerRecord> },
}

pub struct PeerMirror {
    me: PlayerRecord,
    team: Option<Team>,
    view: MirrorView,
    rosters: Rosters,
    paused: bool,
    available_colors: Vec<String>,
    selected_color: Option<String>,
    snapshot: Option<Snapshot>,
    start_rejected: bool,
}

impl PeerMirror {
    pub fn new(peer_id: &str, name: &str) -> Self {
        Self {
            me: Self::fresh_record(peer_id, name),
            team: None,
            view: MirrorView::PreLobby,
            rosters: Rosters::default(),
            paused: true,
            available_colors: Vec::new(),
            selected_color: None,
            snapshot: None,
            start_rejected: false,
        }
    }

    // Clients build their player at (100, 100) with default tuning; the host re-derives the
    // rest from its own config.
    fn fresh_record(peer_id: &str, name: &str) -> PlayerRecord {
        let config = GameConfig::default();
        let player = Player::new(peer_id, name, 100.0, 100.0, config.arena(), &config.player);
        PlayerRecord::from(&player)
    }

    /// First message on a fresh connection.
    pub fn on_open(&mut self) -> PeerRequest {
        self.view = MirrorView::Lobby;
        PeerRequest::InitialDataRequest
    }

    pub fn apply(&mut self, notice: HostNotice) {
        match notice {
            HostNotice::InitialData {
                rosters,
                paused,
                available_colors,
            } => {
                self.rosters = rosters;
                self.paused = paused;
                self.available_colors = available_colors;
                self.selected_color = self.available_colors.first().cloned();
                self.view = MirrorView::Lobby;
            }
            HostNotice::StartRejected => {
                warn!("host refused to start a game with 0 players");
                self.start_rejected = true;
            }
            HostNotice::TeamUpdate(rosters) => self.rosters = rosters,
            HostNotice::ColorUsed { color, .. } => {
                // Removed by name: the host's index refers to its own pool ordering.
                self.available_colors.retain(|c| *c != color);
                if self.selected_color.as_deref() == Some(color.as_str()) {
                    self.selected_color = self.available_colors.first().cloned();
                }
            }
            HostNotice::ColorAvailable { color } => {
                if !self.available_colors.contains(&color) {
                    self.available_colors.push(color);
                }
                if self.selected_color.is_none() {
                    self.selected_color = self.available_colors.first().cloned();
                }
            }
            HostNotice::PlayerReady(record) => {
                if record.id == self.me.id {
                    self.me.ready = record.ready;
                }
                if let Some(snapshot) = self.snapshot.as_mut() {
                    if let Some(p) = snapshot.players.get_mut(&record.id) {
                        p.ready = record.ready;
                    }
                }
            }
            HostNotice::GameState(snapshot) => {
                self.paused = snapshot.paused;
                if let Some(mine) = snapshot.players.get(&self.me.id) {
                    self.me.lives = mine.lives;
                    self.me.score = mine.score;
                    self.me.x = mine.x;
                    self.me.y = mine.y;
                }
                if !matches!(self.view, MirrorView::GameOver { .. } | MirrorView::PreLobby) {
                    self.view = if snapshot.paused {
                        MirrorView::GameModal
                    } else {
                        MirrorView::Game
                    };
                }
                self.snapshot = Some(snapshot);
            }
            HostNotice::GameStarted | HostNotice::GameRestarting => {
                self.paused = false;
                self.start_rejected = false;
                self.view = MirrorView::Game;
            }
            HostNotice::GameOver { players } => {
                self.me.ready = false;
                info!(players = players.len(), "game over");
                self.view = MirrorView::GameOver { players };
            }
            HostNotice::ShowGameModal => self.view = MirrorView::GameModal,
            HostNotice::PlayerLeft { id } => {
                self.rosters.remove(&id);
                if let Some(snapshot) = self.snapshot.as_mut() {
                    snapshot.players.remove(&id);
                }
            }
        }
    }

    pub fn select_color(&mut self, color: &str) -> bool {
        if self.available_colors.iter().any(|c| c == color) {
            self.selected_color = Some(color.to_string());
            true
        } else {
            false
        }
    }

    /// Client join flow: claim the selected color, enter or leave the player map, publish
    /// the updated rosters. Runs at most once per session.
    pub fn join(&mut self, team: Team) -> Result<Vec<PeerRequest>, LobbyError> {
        if self.me.has_joined_team {
            debug!(peer_id = %self.me.id, "repeat join ignored");
            return Err(LobbyError::AlreadyJoined);
        }
        let color = self
            .selected_color
            .clone()
            .ok_or_else(|| LobbyError::ColorUnavailable(String::new()))?;
        let index = self
            .available_colors
            .iter()
            .position(|c| *c == color)
            .ok_or_else(|| LobbyError::ColorUnavailable(color.clone()))?;

        self.me.has_joined_team = true;
        self.me.color = Some(color.clone());
        self.team = Some(team);

        let mut requests = vec![PeerRequest::UsedColor { color, index }];
        if team.is_playing() {
            requests.push(PeerRequest::SetPlayer(self.me.clone()));
        } else {
            requests.push(PeerRequest::RemovePlayer(self.me.clone()));
        }
        self.rosters.join(
            team,
            RosterEntry {
                name: self.me.name.clone(),
                peer_id: self.me.id.clone(),
            },
        );
        requests.push(PeerRequest::TeamUpdate(self.rosters.clone()));
        info!(peer_id = %self.me.id, team = %team, "joining team");
        Ok(requests)
    }

    /// Input is only forwarded once the peer plays on a team.
    pub fn input(&self, flags: ControlFlags) -> Option<PeerRequest> {
        match self.team {
            Some(team) if team.is_playing() => Some(PeerRequest::UserInput {
                id: self.me.id.clone(),
                flags,
            }),
            _ => None,
        }
    }

    pub fn toggle_ready(&mut self) -> PeerRequest {
        self.me.ready = !self.me.ready;
        PeerRequest::PlayerReady(self.me.clone())
    }

    pub fn pause_clicked(&self) -> PeerRequest {
        PeerRequest::PauseClicked
    }

    /// Host loss is terminal: back to the pre-lobby state with a fresh player.
    pub fn on_host_lost(&mut self) {
        warn!(peer_id = %self.me.id, "host connection lost");
        let (id, name) = (self.me.id.clone(), self.me.name.clone());
        *self = Self::new(&id, &name);
    }

    pub fn me(&self) -> &PlayerRecord {
        &self.me
    }

    pub fn team(&self) -> Option<Team> {
        self.team
    }

    pub fn view(&self) -> &MirrorView {
        &self.view
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn available_colors(&self) -> &[String] {
        &self.available_colors
    }

    pub fn selected_color(&self) -> Option<&str> {
        self.selected_color.as_deref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn start_rejected(&self) -> bool {
        self.start_rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> Vec<String> {
        ["Blue", "Green", "Purple"].map(String::from).to_vec()
    }

    fn seeded(id: &str) -> PeerMirror {
        let mut mirror = PeerMirror::new(id, "Pat");
        assert_eq!(mirror.on_open(), PeerRequest::InitialDataRequest);
        mirror.apply(HostNotice::InitialData {
            rosters: Rosters::default(),
            paused: true,
            available_colors: colors(),
        });
        mirror
    }

    fn entry(id: &str) -> RosterEntry {
        RosterEntry {
            name: id.to_uppercase(),
            peer_id: id.to_string(),
        }
    }

    #[test]
    fn when_joining_a_playing_team_then_color_player_and_rosters_are_sent_in_order() {
        let mut mirror = seeded("me");
        assert!(mirror.select_color("Green"));

        let requests = mirror.join(Team::Blue).expect("first join");

        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0],
            PeerRequest::UsedColor {
                color: "Green".into(),
                index: 1
            }
        );
        assert!(matches!(&requests[1], PeerRequest::SetPlayer(r) if r.id == "me" && r.has_joined_team));
        assert!(matches!(&requests[2], PeerRequest::TeamUpdate(r) if r.blue.len() == 1));
        assert!(mirror.input(ControlFlags::default()).is_some());
    }

    #[test]
    fn when_joining_spectators_then_no_input_is_forwarded() {
        let mut mirror = seeded("me");
        let requests = mirror.join(Team::Spectators).expect("first join");
        assert!(matches!(&requests[1], PeerRequest::RemovePlayer(_)));
        assert_eq!(mirror.input(ControlFlags::default()), None);
    }

    #[test]
    fn when_joining_twice_then_second_attempt_is_refused() {
        let mut mirror = seeded("me");
        mirror.join(Team::Red).expect("first join");
        assert_eq!(mirror.join(Team::Blue), Err(LobbyError::AlreadyJoined));
        assert_eq!(mirror.team(), Some(Team::Red));
    }

    #[test]
    fn when_team_update_arrives_then_membership_and_order_match_the_host() {
        let mut mirror = seeded("me");
        let rosters = Rosters {
            red: vec![entry("a")],
            blue: vec![entry("b")],
            spectators: Vec::new(),
        };
        mirror.apply(HostNotice::TeamUpdate(rosters.clone()));
        assert_eq!(mirror.rosters(), &rosters);
    }

    #[test]
    fn when_selected_color_is_used_elsewhere_then_selection_moves_on() {
        let mut mirror = seeded("me");
        assert_eq!(mirror.selected_color(), Some("Blue"));
        mirror.apply(HostNotice::ColorUsed {
            color: "Blue".into(),
            index: 0,
        });
        assert_eq!(mirror.available_colors(), ["Green", "Purple"]);
        assert_eq!(mirror.selected_color(), Some("Green"));

        mirror.apply(HostNotice::ColorAvailable {
            color: "Blue".into(),
        });
        mirror.apply(HostNotice::ColorAvailable {
            color: "Blue".into(),
        });
        assert_eq!(mirror.available_colors(), ["Green", "Purple", "Blue"]);
    }

    #[test]
    fn when_game_over_arrives_after_final_snapshot_then_view_stays_on_game_over() {
        let mut mirror = seeded("me");
        mirror.apply(HostNotice::GameStarted);
        assert_eq!(mirror.view(), &MirrorView::Game);

        mirror.apply(HostNotice::GameOver {
            players: BTreeMap::new(),
        });
        mirror.apply(HostNotice::GameState(Snapshot {
            tick: 9,
            players: BTreeMap::new(),
            enemies: Vec::new(),
            coins: Vec::new(),
            projectiles: Vec::new(),
            paused: false,
        }));
        assert!(matches!(mirror.view(), MirrorView::GameOver { .. }));

        mirror.apply(HostNotice::GameRestarting);
        assert_eq!(mirror.view(), &MirrorView::Game);
    }

    #[test]
    fn when_host_is_lost_then_mirror_resets_to_pre_lobby() {
        let mut mirror = seeded("me");
        mirror.join(Team::Red).expect("join");

        mirror.on_host_lost();

        assert_eq!(mirror.view(), &MirrorView::PreLobby);
        assert!(!mirror.me().has_joined_team);
        assert_eq!(mirror.team(), None);
        assert!(mirror.available_colors().is_empty());
        assert_eq!(mirror.me().id, "me");
    }

    #[test]
    fn when_host_refuses_to_start_then_rejection_is_recorded() {
        let mut mirror = seeded("me");
        mirror.apply(HostNotice::StartRejected);
        assert!(mirror.start_rejected());
        mirror.apply(HostNotice::GameStarted);
        assert!(!mirror.start_rejected());
    }
}
