// Team rosters, color allocation, ready-up and disconnect cleanup on the host.

use crate::domain::{
    Clock, ColorPool, LobbyError, PeerId, Player, PlayerRecord, RosterEntry, Rosters, Scheduler,
    Team,
};
use crate::use_cases::session::GameSession;
use crate::use_cases::types::{HostNotice, PeerLink, SessionPhase};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

pub struct LobbyCoordinator {
    rosters: Rosters,
    colors: ColorPool,
    // Peers whose one-shot join transition has fired.
    joined: HashSet<PeerId>,
    // Players sitting out as spectators; kept so a later rejoin does not rebuild them.
    bench: BTreeMap<PeerId, Player>,
}

impl LobbyCoordinator {
    pub fn new(colors: &[String]) -> Self {
        Self {
            rosters: Rosters::default(),
            colors: ColorPool::new(colors.iter().cloned()),
            joined: HashSet::new(),
            bench: BTreeMap::new(),
        }
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    pub fn colors(&self) -> &ColorPool {
        &self.colors
    }

    pub fn has_joined(&self, peer_id: &str) -> bool {
        self.joined.contains(peer_id)
    }

    pub fn benched(&self, peer_id: &str) -> Option<&Player> {
        self.bench.get(peer_id)
    }

    pub fn initial_data(&self, paused: bool) -> HostNotice {
        HostNotice::InitialData {
            rosters: self.rosters.clone(),
            paused,
            available_colors: self.colors.available().to_vec(),
        }
    }

    /// Takes `color` out of the pool for `holder` and tells every peer which slot went away.
    pub fn claim_color<C, S, L>(
        &mut self,
        session: &GameSession<C, S, L>,
        holder: &str,
        color: &str,
    ) -> Result<usize, LobbyError>
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        match self.colors.claim(color, holder) {
            Ok(index) => {
                info!(peer_id = %holder, color = %color, index, "color claimed");
                session.broadcast(&HostNotice::ColorUsed {
                    color: color.to_string(),
                    index,
                });
                Ok(index)
            }
            Err(e) => {
                warn!(peer_id = %holder, color = %color, error = %e, "color claim refused");
                Err(e)
            }
        }
    }

    /// Replaces the rosters wholesale (last write wins) and re-broadcasts them in full.
    pub fn adopt_rosters<C, S, L>(&mut self, session: &GameSession<C, S, L>, rosters: Rosters)
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        self.rosters = rosters;
        debug!(members = self.rosters.len(), "rosters adopted");
        session.broadcast(&HostNotice::TeamUpdate(self.rosters.clone()));
    }

    /// Registers a remote peer as an active player (joined a playing team).
    pub fn set_player<C, S, L>(
        &mut self,
        session: &mut GameSession<C, S, L>,
        record: &PlayerRecord,
    ) -> Result<(), LobbyError>
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        self.mark_joined(&record.id)?;
        let player = self.player_for(session, &record.id, &record.name, record.x, record.y);
        session.register_player(player);
        Ok(())
    }

    /// Moves a remote peer out of the player map (joined the spectators).
    pub fn remove_player<C, S, L>(
        &mut self,
        session: &mut GameSession<C, S, L>,
        record: &PlayerRecord,
    ) -> Result<(), LobbyError>
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        self.mark_joined(&record.id)?;
        let player = match session.unregister_player(&record.id) {
            Some(player) => player,
            None => self.player_for(session, &record.id, &record.name, record.x, record.y),
        };
        self.bench.insert(record.id.clone(), player);
        Ok(())
    }

    /// Full join transition performed on the host itself: claim color, move between the
    /// player map and the bench, update rosters, broadcast.
    ///
    /// Fails without side effects when the peer already joined or the color is taken.
    pub fn join_team<C, S, L>(
        &mut self,
        session: &mut GameSession<C, S, L>,
        peer_id: &str,
        name: &str,
        team: Team,
        color: &str,
    ) -> Result<(), LobbyError>
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        if self.joined.contains(peer_id) {
            debug!(peer_id = %peer_id, "repeat join ignored");
            return Err(LobbyError::AlreadyJoined);
        }
        self.claim_color(session, peer_id, color)?;
        self.joined.insert(peer_id.to_string());

        // Fresh joiners start where the client places them.
        let player = self.player_for(session, peer_id, name, 100.0, 100.0);
        if team.is_playing() {
            session.register_player(player);
        } else {
            self.bench.insert(peer_id.to_string(), player);
        }

        self.rosters.join(
            team,
            RosterEntry {
                name: name.to_string(),
                peer_id: peer_id.to_string(),
            },
        );
        info!(peer_id = %peer_id, team = %team, "joined team");
        session.broadcast(&HostNotice::TeamUpdate(self.rosters.clone()));
        Ok(())
    }

    /// Flips the player's ready flag. Returns true if this made everyone ready after a
    /// finished match and the session restarted.
    ///
    /// Unanimous ready only restarts from `GameOver`/`ReadyCheck`; during a live match or
    /// in the lobby it just records the flag.
    pub fn toggle_ready<C, S, L>(
        &mut self,
        session: &mut GameSession<C, S, L>,
        peer_id: &str,
    ) -> Result<bool, LobbyError>
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        let player = session
            .player_mut(peer_id)
            .ok_or_else(|| LobbyError::UnknownPeer(peer_id.to_string()))?;
        player.ready = !player.ready;
        let record = PlayerRecord::from(&*player);
        debug!(peer_id = %peer_id, ready = record.ready, "ready toggled");
        session.broadcast(&HostNotice::PlayerReady(record));

        if session.phase() == SessionPhase::GameOver {
            session.set_phase(SessionPhase::ReadyCheck);
        }
        if session.phase().is_over() && session.all_ready() {
            info!(players = session.players().len(), "all players ready");
            session.broadcast(&HostNotice::GameRestarting);
            session.restart();
            return Ok(true);
        }
        Ok(false)
    }

    /// Cleans up after a closed connection. Returns false for a stale connection that was
    /// already replaced by a newer one.
    pub fn disconnect<C, S, L>(
        &mut self,
        session: &mut GameSession<C, S, L>,
        peer_id: &str,
        conn_id: u64,
    ) -> bool
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        if !session.remove_connection(peer_id, conn_id) {
            debug!(peer_id = %peer_id, conn_id, "stale disconnect ignored");
            return false;
        }

        let released = self.colors.release(peer_id);
        session.unregister_player(peer_id);
        self.bench.remove(peer_id);
        self.joined.remove(peer_id);

        session.broadcast(&HostNotice::PlayerLeft {
            id: peer_id.to_string(),
        });
        self.rosters.remove(peer_id);
        session.broadcast(&HostNotice::TeamUpdate(self.rosters.clone()));
        if let Some(color) = released {
            info!(peer_id = %peer_id, color = %color, "color returned to pool");
            session.broadcast(&HostNotice::ColorAvailable { color });
        }
        info!(peer_id = %peer_id, players = session.players().len(), "peer disconnected");

        if session.players().is_empty() && session.phase().is_over() {
            session.return_to_lobby();
        }
        true
    }

    fn mark_joined(&mut self, peer_id: &str) -> Result<(), LobbyError> {
        if !self.joined.insert(peer_id.to_string()) {
            debug!(peer_id = %peer_id, "repeat join ignored");
            return Err(LobbyError::AlreadyJoined);
        }
        Ok(())
    }

    // Reuses a benched player when there is one; the color always comes from the pool.
    fn player_for<C, S, L>(
        &mut self,
        session: &GameSession<C, S, L>,
        peer_id: &str,
        name: &str,
        x: f32,
        y: f32,
    ) -> Player
    where
        C: Clock,
        S: Scheduler,
        L: PeerLink,
    {
        let mut player = self
            .bench
            .remove(peer_id)
            .unwrap_or_else(|| session.new_player(peer_id, name, x, y));
        player.color = self.colors.color_of(peer_id).map(str::to_string);
        player.has_joined_team = true;
        player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameConfig;
    use crate::use_cases::session::SessionTiming;
    use crate::use_cases::testing::{FakeClock, ManualScheduler, RecordingLink};

    type Session = GameSession<FakeClock, ManualScheduler, RecordingLink>;

    fn setup() -> (LobbyCoordinator, Session, RecordingLink) {
        let config = GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        };
        let lobby = LobbyCoordinator::new(&config.player_colors);
        let mut session = GameSession::new(
            config,
            SessionTiming::default(),
            FakeClock::at(0),
            ManualScheduler::default(),
        )
        .expect("valid config");
        let link = RecordingLink::new(1);
        session.add_connection("watcher".into(), link.clone());
        (lobby, session, link)
    }

    fn record(session: &Session, id: &str) -> PlayerRecord {
        PlayerRecord::from(&session.new_player(id, id, 100.0, 100.0))
    }

    #[test]
    fn when_player_joins_a_playing_team_then_session_and_rosters_update() {
        let (mut lobby, mut session, link) = setup();

        lobby
            .join_team(&mut session, "a", "Ann", Team::Red, "Green")
            .expect("first join");

        let player = session.player("a").expect("registered");
        assert_eq!(player.color.as_deref(), Some("Green"));
        assert!(player.has_joined_team);
        assert_eq!(lobby.rosters().team_of("a"), Some(Team::Red));
        assert!(!lobby.colors().available().contains(&"Green".to_string()));
        assert_eq!(
            link.count(|n| *n == HostNotice::ColorUsed {
                color: "Green".into(),
                index: 1
            }),
            1
        );
        assert_eq!(link.count(|n| matches!(n, HostNotice::TeamUpdate(_))), 1);
    }

    #[test]
    fn when_player_joins_spectators_then_it_is_benched_not_registered() {
        let (mut lobby, mut session, _link) = setup();

        lobby
            .join_team(&mut session, "s", "Sid", Team::Spectators, "Blue")
            .expect("first join");

        assert!(session.player("s").is_none());
        assert!(lobby.benched("s").is_some());
        assert_eq!(lobby.rosters().spectators.len(), 1);
    }

    #[test]
    fn when_player_joins_twice_then_second_join_changes_nothing() {
        let (mut lobby, mut session, link) = setup();
        lobby
            .join_team(&mut session, "a", "Ann", Team::Red, "Blue")
            .expect("first join");
        link.clear();

        let again = lobby.join_team(&mut session, "a", "Ann", Team::Blue, "Green");

        assert_eq!(again, Err(LobbyError::AlreadyJoined));
        assert_eq!(lobby.rosters().team_of("a"), Some(Team::Red));
        assert!(lobby.colors().available().contains(&"Green".to_string()));
        assert!(link.sent().is_empty());
    }

    #[test]
    fn when_two_peers_claim_one_color_then_the_first_keeps_it() {
        let (mut lobby, mut session, link) = setup();
        lobby.claim_color(&session, "a", "Pink").expect("first claim");
        let second = lobby.claim_color(&session, "b", "Pink");
        assert_eq!(second, Err(LobbyError::ColorUnavailable("Pink".into())));

        let rec = record(&session, "b");
        lobby.set_player(&mut session, &rec).expect("first set");
        assert_eq!(session.player("b").expect("registered").color, None);
        assert_eq!(
            link.count(|n| matches!(n, HostNotice::ColorUsed { color, .. } if color == "Pink")),
            1
        );
    }

    #[test]
    fn when_remote_peer_sets_then_removes_itself_then_only_the_first_counts() {
        let (mut lobby, mut session, _link) = setup();
        let rec = record(&session, "p");

        lobby.set_player(&mut session, &rec).expect("first join");
        assert_eq!(
            lobby.remove_player(&mut session, &rec),
            Err(LobbyError::AlreadyJoined)
        );
        assert!(session.player("p").is_some());
    }

    #[test]
    fn when_holder_disconnects_then_color_returns_once_and_rosters_shrink() {
        let (mut lobby, mut session, link) = setup();
        session.add_connection("a".into(), RecordingLink::new(2));
        lobby
            .join_team(&mut session, "a", "Ann", Team::Blue, "Purple")
            .expect("join");
        link.clear();

        assert!(lobby.disconnect(&mut session, "a", 2));
        assert!(!lobby.disconnect(&mut session, "a", 2));

        assert!(session.player("a").is_none());
        assert!(lobby.rosters().is_empty());
        let purple = lobby
            .colors()
            .available()
            .iter()
            .filter(|c| c.as_str() == "Purple")
            .count();
        assert_eq!(purple, 1);
        assert_eq!(
            link.sent(),
            vec![
                HostNotice::PlayerLeft { id: "a".into() },
                HostNotice::TeamUpdate(Rosters::default()),
                HostNotice::ColorAvailable {
                    color: "Purple".into()
                },
            ]
        );
    }

    #[test]
    fn when_every_player_readies_after_game_over_then_session_restarts() {
        let (mut lobby, mut session, link) = setup();
        for (id, x) in [("a", 100.0), ("b", 900.0)] {
            let player = session.new_player(id, id, x, 100.0);
            session.register_player(player);
        }
        session.start();
        session.on_timer();
        for id in ["a", "b"] {
            session.player_mut(id).expect("player").lives = 0;
        }
        session.tick();
        assert_eq!(session.phase(), SessionPhase::GameOver);

        assert_eq!(lobby.toggle_ready(&mut session, "a"), Ok(false));
        assert_eq!(session.phase(), SessionPhase::ReadyCheck);
        assert_eq!(lobby.toggle_ready(&mut session, "b"), Ok(true));

        assert_eq!(session.phase(), SessionPhase::Countdown);
        assert!(!session.is_game_over());
        assert!(session.players().values().all(|p| !p.ready && p.lives == 3));
        assert_eq!(link.count(|n| *n == HostNotice::GameRestarting), 1);
    }

    #[test]
    fn when_everyone_is_ready_mid_match_then_no_restart_happens() {
        let (mut lobby, mut session, _link) = setup();
        let player = session.new_player("a", "a", 100.0, 100.0);
        session.register_player(player);
        session.start();

        assert_eq!(lobby.toggle_ready(&mut session, "a"), Ok(false));
        assert_eq!(session.phase(), SessionPhase::Countdown);
    }

    #[test]
    fn when_ready_names_an_unknown_peer_then_it_is_refused() {
        let (mut lobby, mut session, _link) = setup();
        assert_eq!(
            lobby.toggle_ready(&mut session, "nobody"),
            Err(LobbyError::UnknownPeer("nobody".into()))
        );
    }

    #[test]
    fn when_last_player_leaves_after_game_over_then_session_returns_to_lobby() {
        let (mut lobby, mut session, link) = setup();
        session.add_connection("a".into(), RecordingLink::new(2));
        session.add_connection("b".into(), RecordingLink::new(3));
        lobby
            .join_team(&mut session, "a", "Ann", Team::Red, "Blue")
            .expect("join");
        lobby
            .join_team(&mut session, "b", "Bob", Team::Blue, "Green")
            .expect("join");
        session.start();
        session.on_timer();
        for id in ["a", "b"] {
            session.player_mut(id).expect("player").lives = 0;
        }
        session.tick();
        link.clear();

        lobby.disconnect(&mut session, "a", 2);
        assert_eq!(session.phase(), SessionPhase::GameOver);
        lobby.disconnect(&mut session, "b", 3);

        assert_eq!(session.phase(), SessionPhase::Lobby);
        assert_eq!(link.count(|n| *n == HostNotice::ShowGameModal), 1);
    }

    #[test]
    fn when_rosters_are_adopted_then_membership_and_order_are_rebroadcast() {
        let (mut lobby, session, link) = setup();
        let entry = |n: &str| RosterEntry {
            name: n.to_uppercase(),
            peer_id: n.to_string(),
        };
        let rosters = Rosters {
            red: vec![entry("a")],
            blue: vec![entry("b")],
            spectators: Vec::new(),
        };

        lobby.adopt_rosters(&session, rosters.clone());

        assert_eq!(lobby.rosters(), &rosters);
        assert_eq!(link.sent(), vec![HostNotice::TeamUpdate(rosters)]);
    }
}
