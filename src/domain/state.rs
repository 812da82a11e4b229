// Domain-level snapshot types: the read-only view of the simulation that leaves the host.

use crate::domain::entities::{Coin, Direction, Enemy, PeerId, Player, Projectile};
use std::collections::BTreeMap;

/// Public player record: what peers see in snapshots and what they send when joining.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PeerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
    pub lives: i32,
    pub score: u32,
    pub ready: bool,
    pub color: Option<String>,
    pub has_joined_team: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemySnapshot {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoinSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub owner_id: PeerId,
}

/// Full state sent on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub players: BTreeMap<PeerId, PlayerRecord>,
    pub enemies: Vec<EnemySnapshot>,
    pub coins: Vec<CoinSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub paused: bool,
}

impl From<&Player> for PlayerRecord {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
            width: p.width,
            height: p.height,
            lives: p.lives,
            score: p.score,
            ready: p.ready,
            color: p.color.clone(),
            has_joined_team: p.has_joined_team,
        }
    }
}

impl From<&Enemy> for EnemySnapshot {
    fn from(e: &Enemy) -> Self {
        Self {
            x: e.x,
            y: e.y,
            dx: e.dx,
            dy: e.dy,
            width: e.width,
            height: e.height,
        }
    }
}

impl From<&Coin> for CoinSnapshot {
    fn from(c: &Coin) -> Self {
        Self {
            x: c.x,
            y: c.y,
            width: c.width,
            height: c.height,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            x: p.x,
            y: p.y,
            direction: p.direction,
            owner_id: p.owner_id.clone(),
        }
    }
}
