use crate::domain::entities::{Direction, PeerId, Player, Projectile};
use crate::domain::geometry::{Arena, Bounded};
use crate::domain::tuning::ProjectileTuning;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectileHit {
    pub victim_id: PeerId,
    pub shooter_id: PeerId,
}

/// Spawns a four-way volley for every live player holding `action` whose cooldown has elapsed.
pub fn fire_volleys(
    players: &mut BTreeMap<PeerId, Player>,
    projectiles: &mut Vec<Projectile>,
    now: u64,
    tuning: &ProjectileTuning,
) {
    for player in players.values_mut() {
        if !player.is_alive() || !player.controls.action {
            continue;
        }
        let cooling = match player.last_volley_at {
            Some(last) => now.saturating_sub(last) < tuning.cooldown_ms,
            None => false,
        };
        if cooling {
            continue;
        }

        // Spawn from the player's center.
        let x = player.x + (player.width - tuning.size) / 2.0;
        let y = player.y + (player.height - tuning.size) / 2.0;
        for direction in Direction::ALL {
            projectiles.push(Projectile::new(x, y, direction, player.id.clone(), tuning));
        }
        player.last_volley_at = Some(now);
    }
}

/// Moves projectiles, drops those outside the arena and applies hits.
///
/// A projectile is consumed by the first live non-owner it overlaps, costing that player one
/// life.
pub fn tick_projectiles(
    players: &mut BTreeMap<PeerId, Player>,
    projectiles: &mut Vec<Projectile>,
    arena: Arena,
) -> Vec<ProjectileHit> {
    for shot in projectiles.iter_mut() {
        shot.update();
    }
    projectiles.retain(|shot| shot.in_arena(arena));

    let mut hits = Vec::new();
    projectiles.retain(|shot| {
        for victim in players.values_mut() {
            if !victim.is_alive() || victim.id == shot.owner_id {
                continue;
            }
            if victim.overlaps(shot) {
                victim.lose_life();
                info!(
                    victim_id = %victim.id,
                    shooter_id = %shot.owner_id,
                    victim_lives = victim.lives,
                    "player hit"
                );
                hits.push(ProjectileHit {
                    victim_id: victim.id.clone(),
                    shooter_id: shot.owner_id.clone(),
                });
                return false;
            }
        }
        true
    });

    hits
}
