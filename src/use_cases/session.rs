// Authoritative state machine for one match: owns every entity and every peer link.

use crate::domain::systems::collision::resolve_collisions;
use crate::domain::systems::projectiles::{fire_volleys, tick_projectiles};
use crate::domain::systems::spawning::{SpawnTimer, spawn_coin, spawn_enemy};
use crate::domain::{
    Arena, Clock, Coin, CoinSettings, ControlFlags, Enemy, GameConfig, PeerId, Player,
    PlayerRecord, Projectile, Scheduler, SessionError, Snapshot,
};
use crate::use_cases::types::{HostNotice, PeerLink, SessionPhase};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Scheduler periods used by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Snapshot rate while running.
    pub tick_interval: Duration,
    /// Coarse poll while waiting for the first player.
    pub poll_interval: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_micros(1_000_000 / 60),
            poll_interval: Duration::from_secs(1),
        }
    }
}

pub struct GameSession<C, S, L> {
    config: GameConfig,
    settings: CoinSettings,
    arena: Arena,
    phase: SessionPhase,
    timing: SessionTiming,

    players: BTreeMap<PeerId, Player>,
    enemies: Vec<Enemy>,
    coins: Vec<Coin>,
    projectiles: Vec<Projectile>,
    paused: bool,
    game_over: bool,
    enemy_timer: SpawnTimer,
    coin_timer: SpawnTimer,
    tick: u64,

    connections: HashMap<PeerId, L>,
    clock: C,
    scheduler: S,
    rng: Pcg32,
}

impl<C, S, L> GameSession<C, S, L>
where
    C: Clock,
    S: Scheduler,
    L: PeerLink,
{
    pub fn new(
        config: GameConfig,
        timing: SessionTiming,
        clock: C,
        scheduler: S,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let now = clock.now_millis();
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::seed_from_u64(rand::random()),
        };
        Ok(Self {
            arena: config.arena(),
            config,
            settings: CoinSettings::default(),
            phase: SessionPhase::Lobby,
            timing,
            players: BTreeMap::new(),
            enemies: Vec::new(),
            coins: Vec::new(),
            projectiles: Vec::new(),
            paused: true,
            game_over: false,
            enemy_timer: SpawnTimer::new(now),
            coin_timer: SpawnTimer::new(now),
            tick: 0,
            connections: HashMap::new(),
            clock,
            scheduler,
            rng,
        })
    }

    // ---- lifecycle ----

    /// Announces the match and waits (polling) for at least one registered player.
    pub fn start(&mut self) {
        self.broadcast(&HostNotice::GameStarted);
        self.paused = false;
        self.phase = SessionPhase::Countdown;
        self.scheduler.start(self.timing.poll_interval);
        info!(players = self.players.len(), "match starting");
    }

    /// Sends one final snapshot and cancels the tick producer.
    pub fn stop(&mut self) {
        let snapshot = self.snapshot();
        self.broadcast(&HostNotice::GameState(snapshot));
        self.scheduler.stop();
        debug!(tick = self.tick, "tick producer stopped");
    }

    pub fn restart(&mut self) {
        for player in self.players.values_mut() {
            player.reset(&self.config.player);
            player.last_volley_at = None;
        }
        self.clear_entities();
        self.paused = false;
        self.game_over = false;

        let protected_until = self.clock.now_millis() + self.config.spawn_protection_ms;
        self.enemy_timer.hold_until(protected_until);
        self.coin_timer.hold_until(protected_until);

        info!(players = self.players.len(), "match restarting");
        self.start();
    }

    /// Scheduler callback. Promotes Countdown to Running once a player exists, ticks while
    /// running.
    pub fn on_timer(&mut self) {
        match self.phase {
            SessionPhase::Countdown => {
                if !self.players.is_empty() {
                    self.phase = SessionPhase::Running;
                    self.scheduler.start(self.timing.tick_interval);
                    info!(players = self.players.len(), "match running");
                }
            }
            SessionPhase::Running => self.tick(),
            SessionPhase::Lobby | SessionPhase::GameOver | SessionPhase::ReadyCheck => {}
        }
    }

    pub fn tick(&mut self) {
        self.tick += 1;
        let snapshot = self.snapshot();
        self.broadcast(&HostNotice::GameState(snapshot));

        if self.paused || self.game_over {
            return;
        }

        let now = self.clock.now_millis();
        if self
            .enemy_timer
            .try_fire(now, self.config.enemy.spawn_rate_ms)
        {
            let enemy = spawn_enemy(&mut self.rng, self.arena, &self.config.enemy);
            self.enemies.push(enemy);
        }
        if self.coin_timer.try_fire(now, self.config.coin.spawn_rate_ms) {
            let coin = spawn_coin(&mut self.rng, self.arena, &self.config.coin, now);
            self.coins.push(coin);
        }

        resolve_collisions(&mut self.players, &mut self.coins, &mut self.enemies);

        if self.config.projectile.enabled {
            fire_volleys(
                &mut self.players,
                &mut self.projectiles,
                now,
                &self.config.projectile,
            );
            tick_projectiles(&mut self.players, &mut self.projectiles, self.arena);
        }

        let settings = self.settings;
        let max_age = self.config.coin.max_age_ms;
        for coin in self.coins.iter_mut() {
            coin.update(settings, now);
        }
        self.coins.retain(|coin| coin.age(now) <= max_age);

        let arena = self.arena;
        self.enemies.retain_mut(|enemy| enemy.update(arena));

        let allow_ghosts = self.config.player.allow_ghosts;
        for player in self.players.values_mut() {
            player.update(arena, allow_ghosts);
        }

        if match_over(&self.players) {
            self.end_match();
        }
    }

    fn end_match(&mut self) {
        self.game_over = true;
        self.phase = SessionPhase::GameOver;
        info!(
            tick = self.tick,
            players = self.players.len(),
            "match ended"
        );

        let players = self.player_records();
        self.broadcast(&HostNotice::GameOver { players });
        // Mirrors already on the game-over view keep it when this snapshot lands.
        self.stop();

        for player in self.players.values_mut() {
            player.ready = false;
        }
        if self.players.is_empty() {
            self.return_to_lobby();
        }
    }

    /// Back to the pre-match state once nobody is left to play.
    pub fn return_to_lobby(&mut self) {
        self.scheduler.stop();
        self.clear_entities();
        self.paused = true;
        self.game_over = false;
        self.phase = SessionPhase::Lobby;
        self.broadcast(&HostNotice::ShowGameModal);
        info!("session back in lobby");
    }

    /// Flips the pause flag and starts or stops the tick producer accordingly.
    ///
    /// Returns the new pause state. Ignored after game over; restart goes through ready-up.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.players.is_empty() {
            return Err(SessionError::NoPlayers);
        }
        if self.phase.is_over() {
            debug!(phase = self.phase.as_str(), "pause toggle ignored after game over");
            return Ok(self.paused);
        }

        self.paused = !self.paused;
        if self.paused {
            self.stop();
        } else {
            self.start();
        }
        let snapshot = self.snapshot();
        self.broadcast(&HostNotice::GameState(snapshot));
        info!(paused = self.paused, "pause toggled");
        Ok(self.paused)
    }

    /// Replaces gameplay tuning. Refused while a match is live and unpaused.
    pub fn apply_config(&mut self, config: GameConfig) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Running && !self.paused {
            return Err(SessionError::MatchInProgress);
        }
        config.validate()?;
        self.arena = config.arena();
        for player in self.players.values_mut() {
            player.retune(self.arena, &config.player);
        }
        if let Some(seed) = config.seed {
            self.rng = Pcg32::seed_from_u64(seed);
        }
        self.config = config;
        info!("game config applied");
        Ok(())
    }

    pub fn apply_settings(&mut self, settings: CoinSettings) {
        self.settings = settings;
    }

    fn clear_entities(&mut self) {
        self.enemies.clear();
        self.coins.clear();
        self.projectiles.clear();
    }

    // ---- players ----

    /// Builds a player sized and tuned for this session.
    pub fn new_player(&self, id: &str, name: &str, x: f32, y: f32) -> Player {
        Player::new(id, name, x, y, self.arena, &self.config.player)
    }

    pub fn register_player(&mut self, player: Player) {
        info!(peer_id = %player.id, name = %player.name, "player registered");
        self.players.insert(player.id.clone(), player);
    }

    pub fn unregister_player(&mut self, id: &str) -> Option<Player> {
        let removed = self.players.remove(id);
        if removed.is_some() {
            info!(peer_id = %id, "player unregistered");
        }
        removed
    }

    pub fn set_controls(&mut self, id: &str, flags: ControlFlags) -> Result<(), SessionError> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownPlayer(id.to_string()))?;
        player.controls = flags;
        Ok(())
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn players(&self) -> &BTreeMap<PeerId, Player> {
        &self.players
    }

    pub fn player_records(&self) -> BTreeMap<PeerId, PlayerRecord> {
        self.players
            .iter()
            .map(|(id, p)| (id.clone(), PlayerRecord::from(p)))
            .collect()
    }

    pub fn all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.ready)
    }

    // ---- connections ----

    /// Adds a link, replacing any earlier link for the same peer.
    pub fn add_connection(&mut self, peer_id: PeerId, link: L) -> Option<L> {
        self.connections.insert(peer_id, link)
    }

    /// Removes the peer's link only if it is still the connection identified by `conn_id`.
    pub fn remove_connection(&mut self, peer_id: &str, conn_id: u64) -> bool {
        match self.connections.get(peer_id) {
            Some(link) if link.conn_id() == conn_id => {
                self.connections.remove(peer_id);
                true
            }
            _ => false,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn send_to(&self, peer_id: &str, notice: &HostNotice) {
        let Some(link) = self.connections.get(peer_id) else {
            debug!(peer_id = %peer_id, "no connection for direct notice");
            return;
        };
        if let Some(frame) = L::encode(notice) {
            if !link.send(frame) {
                warn!(peer_id = %peer_id, "direct notice dropped");
                link.lagged();
            }
        }
    }

    /// Encodes once and fans the frame out to every connection.
    ///
    /// A dropped snapshot is superseded by the next one. Any other dropped notice leaves the
    /// peer out of sync, so its link is told to close and the usual disconnect cleanup follows.
    pub fn broadcast(&self, notice: &HostNotice) {
        if self.connections.is_empty() {
            return;
        }
        let Some(frame) = L::encode(notice) else {
            return;
        };
        let snapshot = matches!(notice, HostNotice::GameState(_));
        for (peer_id, link) in &self.connections {
            if link.send(frame.clone()) {
                continue;
            }
            if snapshot {
                debug!(peer_id = %peer_id, "snapshot dropped");
            } else {
                warn!(peer_id = %peer_id, conn_id = link.conn_id(), "peer lagging; closing link");
                link.lagged();
            }
        }
    }

    // ---- views ----

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            players: self.player_records(),
            enemies: self.enemies.iter().map(Into::into).collect(),
            coins: self.coins.iter().map(Into::into).collect(),
            projectiles: self.projectiles.iter().map(Into::into).collect(),
            paused: self.paused,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn settings(&self) -> CoinSettings {
        self.settings
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn coins_mut(&mut self) -> &mut Vec<Coin> {
        &mut self.coins
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// End-of-match rule.
///
/// A lone registered player never ends the match. Otherwise the match ends when nobody is
/// alive, or when exactly one player is alive and out-scores every dead player.
pub fn match_over(players: &BTreeMap<PeerId, Player>) -> bool {
    if players.len() == 1 {
        return false;
    }
    let (alive, dead): (Vec<&Player>, Vec<&Player>) =
        players.values().partition(|p| p.is_alive());
    match alive.as_slice() {
        [] => true,
        [survivor] => dead.iter().all(|d| survivor.score > d.score),
        _ => false,
    }
}
