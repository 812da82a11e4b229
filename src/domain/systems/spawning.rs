use crate::domain::entities::{Coin, Edge, Enemy};
use crate::domain::geometry::Arena;
use crate::domain::tuning::{CoinTuning, EnemyTuning};
use rand::Rng;

/// Tracks the last spawn time of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTimer {
    last_spawn: u64,
}

impl SpawnTimer {
    pub fn new(at: u64) -> Self {
        Self { last_spawn: at }
    }

    pub fn last_spawn(&self) -> u64 {
        self.last_spawn
    }

    /// Pushes the next spawn out; used for spawn protection after a restart.
    pub fn hold_until(&mut self, at: u64) {
        self.last_spawn = at;
    }

    /// True once strictly more than `interval_ms` has passed; re-arms on success.
    pub fn try_fire(&mut self, now: u64, interval_ms: u64) -> bool {
        if now.saturating_sub(self.last_spawn) > interval_ms {
            self.last_spawn = now;
            true
        } else {
            false
        }
    }
}

/// Enemy on a random edge at a random offset along it, heading inward.
pub fn spawn_enemy<R: Rng + ?Sized>(rng: &mut R, arena: Arena, tuning: &EnemyTuning) -> Enemy {
    let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
    let span = match edge {
        Edge::Top | Edge::Bottom => arena.width,
        Edge::Left | Edge::Right => arena.height,
    };
    let offset = rng.random_range(0.0..span);
    Enemy::entering(edge, offset, arena, tuning)
}

/// Coin at a uniformly random position fully inside the arena.
pub fn spawn_coin<R: Rng + ?Sized>(
    rng: &mut R,
    arena: Arena,
    tuning: &CoinTuning,
    now: u64,
) -> Coin {
    let size = arena.shorter_side() * tuning.scale;
    let x = rng.random_range(0.0..=(arena.width - size).max(0.0));
    let y = rng.random_range(0.0..=(arena.height - size).max(0.0));
    Coin::new(x, y, size, now, tuning)
}
