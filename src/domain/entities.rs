// Simulation entities and their per-tick update rules. Updates only touch the entity's own
// fields; spawning, removal and scoring belong to the session.

use crate::domain::geometry::{Arena, Bounded, Rect};
use crate::domain::tuning::{CoinTuning, EnemyTuning, PlayerTuning, ProjectileTuning};

/// Opaque transport-level peer identifier. The host's own id doubles as the lobby code.
pub type PeerId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub action: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PeerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub move_speed: f32,
    pub width: f32,
    pub height: f32,

    pub lives: i32,
    pub score: u32,
    pub controls: ControlFlags,
    pub ready: bool,
    pub color: Option<String>,
    // One-shot guard for the lobby join transition.
    pub has_joined_team: bool,

    // Movement-only state (do not serialize to clients)
    pub last_volley_at: Option<u64>,
}

impl Player {
    pub fn new(
        id: impl Into<PeerId>,
        name: impl Into<String>,
        x: f32,
        y: f32,
        arena: Arena,
        tuning: &PlayerTuning,
    ) -> Self {
        let size = arena.shorter_side() * tuning.scale;
        let mut player = Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            move_speed: tuning.speed,
            width: size,
            height: size,
            lives: tuning.lives,
            score: 0,
            controls: ControlFlags::default(),
            ready: false,
            color: None,
            has_joined_team: false,
            last_volley_at: None,
        };
        player.clamp_into(arena);
        player
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn lose_life(&mut self) {
        self.lives = (self.lives - 1).max(0);
    }

    /// Back to match-start values; position and identity are kept.
    pub fn reset(&mut self, tuning: &PlayerTuning) {
        self.lives = tuning.lives;
        self.score = 0;
        self.ready = false;
        self.move_speed = tuning.speed;
    }

    /// Re-derives size and speed after the arena or tuning changed.
    pub fn retune(&mut self, arena: Arena, tuning: &PlayerTuning) {
        let size = arena.shorter_side() * tuning.scale;
        self.width = size;
        self.height = size;
        self.move_speed = tuning.speed;
        self.clamp_into(arena);
    }

    pub fn update(&mut self, arena: Arena, allow_ghosts: bool) {
        if !self.is_alive() && !allow_ghosts {
            self.dx = 0.0;
            self.dy = 0.0;
            return;
        }

        // Opposite flags cancel out.
        self.dx = 0.0;
        self.dy = 0.0;
        if self.controls.left {
            self.dx -= self.move_speed;
        }
        if self.controls.right {
            self.dx += self.move_speed;
        }
        if self.controls.up {
            self.dy -= self.move_speed;
        }
        if self.controls.down {
            self.dy += self.move_speed;
        }

        self.x += self.dx;
        self.y += self.dy;
        self.clamp_into(arena);
    }

    fn clamp_into(&mut self, arena: Arena) {
        self.x = self.x.min(arena.width - self.width).max(0.0);
        self.y = self.y.min(arena.height - self.height).max(0.0);
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Arena edge an enemy enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
}

impl Enemy {
    /// Places an enemy on `edge`, `offset` pixels along it, heading into the arena.
    pub fn entering(edge: Edge, offset: f32, arena: Arena, tuning: &EnemyTuning) -> Self {
        let size = arena.shorter_side() * tuning.scale;
        let speed = tuning.speed;
        let (x, y, dx, dy) = match edge {
            Edge::Top => (offset, 0.0, 0.0, speed),
            Edge::Bottom => (offset, arena.height, 0.0, -speed),
            Edge::Right => (arena.width, offset, -speed, 0.0),
            Edge::Left => (0.0, offset, speed, 0.0),
        };
        Self {
            x,
            y,
            dx,
            dy,
            width: size,
            height: size,
        }
    }

    /// Moves one step. Returns false once the box has fully left the arena.
    pub fn update(&mut self, arena: Arena) -> bool {
        self.x += self.dx;
        self.y += self.dy;

        !(self.x < -self.width
            || self.x > arena.width
            || self.y < -self.height
            || self.y > arena.height)
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Host-tunable coin behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinSettings {
    pub coin_despawn: bool,
    pub coin_tick: bool,
}

impl Default for CoinSettings {
    fn default() -> Self {
        Self {
            coin_despawn: true,
            coin_tick: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub base_width: f32,
    pub base_height: f32,
    pub spawned_at: u64,
    pub last_shrink_at: u64,
    pub lifespan_ms: u64,
    pub shrink_interval_ms: u64,
}

impl Coin {
    pub fn new(x: f32, y: f32, size: f32, now: u64, tuning: &CoinTuning) -> Self {
        Self {
            x,
            y,
            width: size,
            height: size,
            base_width: size,
            base_height: size,
            spawned_at: now,
            last_shrink_at: now,
            lifespan_ms: tuning.lifespan_ms,
            shrink_interval_ms: tuning.shrink_interval_ms,
        }
    }

    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.spawned_at)
    }

    pub fn update(&mut self, settings: CoinSettings, now: u64) {
        if !settings.coin_despawn {
            return;
        }
        if settings.coin_tick {
            if now.saturating_sub(self.last_shrink_at) > self.shrink_interval_ms {
                self.shrink(now);
                self.last_shrink_at = now;
            }
        } else {
            self.shrink(now);
        }
    }

    /// Linear factor in [0, 1]: 1 at spawn, 0 once the lifespan has elapsed.
    pub fn shrink_factor(&self, now: u64) -> f32 {
        if self.lifespan_ms == 0 {
            return 0.0;
        }
        let remaining = self.lifespan_ms.saturating_sub(self.age(now));
        remaining as f32 / self.lifespan_ms as f32
    }

    fn shrink(&mut self, now: u64) {
        let factor = self.shrink_factor(now);
        self.width = self.base_width * factor;
        self.height = self.base_height * factor;
    }
}

impl Bounded for Coin {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub speed: f32,
    pub size: f32,
    pub owner_id: PeerId,
}

impl Projectile {
    pub fn new(x: f32, y: f32, direction: Direction, owner_id: PeerId, tuning: &ProjectileTuning) -> Self {
        Self {
            x,
            y,
            direction,
            speed: tuning.speed,
            size: tuning.size,
            owner_id,
        }
    }

    pub fn update(&mut self) {
        match self.direction {
            Direction::Up => self.y -= self.speed,
            Direction::Down => self.y += self.speed,
            Direction::Left => self.x -= self.speed,
            Direction::Right => self.x += self.speed,
        }
    }

    pub fn in_arena(&self, arena: Arena) -> bool {
        self.x >= 0.0 && self.x <= arena.width && self.y >= 0.0 && self.y <= arena.height
    }
}

impl Bounded for Projectile {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}
