use crate::domain::entities::{Coin, Enemy, PeerId, Player};
use crate::domain::geometry::Bounded;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub coins_collected: u32,
    pub lives_lost: u32,
}

/// Resolves player/coin and player/enemy overlaps for one tick.
///
/// Only live players take part. Every overlapping coin scores one point and every overlapping
/// enemy costs one life; both are consumed on contact.
pub fn resolve_collisions(
    players: &mut BTreeMap<PeerId, Player>,
    coins: &mut Vec<Coin>,
    enemies: &mut Vec<Enemy>,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    // Coins before enemies: a player hit this tick still banks what it touched.
    for player in players.values_mut() {
        if !player.is_alive() {
            continue;
        }
        let before = coins.len();
        coins.retain(|coin| !player.overlaps(coin));
        let collected = (before - coins.len()) as u32;
        player.score += collected;
        report.coins_collected += collected;
    }

    for player in players.values_mut() {
        if !player.is_alive() {
            continue;
        }
        let before = enemies.len();
        enemies.retain(|enemy| !player.overlaps(enemy));
        let lives_before = player.lives;
        for _ in 0..(before - enemies.len()) {
            player.lose_life();
        }
        report.lives_lost += (lives_before - player.lives) as u32;
    }

    report
}
