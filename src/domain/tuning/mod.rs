// Gameplay tuning for one match. Immutable once handed to a session; changes go through
// `GameSession::apply_config`.

pub mod coin;
pub mod enemy;
pub mod player;
pub mod projectile;

pub use coin::CoinTuning;
pub use enemy::EnemyTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;

use crate::domain::geometry::Arena;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 16.0 * 100.0,
            height: 9.0 * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub coin: CoinTuning,
    pub projectile: ProjectileTuning,

    /// Grace window after a restart during which nothing spawns.
    pub spawn_protection_ms: u64,

    /// Lobby color pool, in selector order.
    pub player_colors: Vec<String>,

    /// Fixed RNG seed for reproducible spawns; random when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            coin: CoinTuning::default(),
            projectile: ProjectileTuning::default(),
            spawn_protection_ms: 1000,
            player_colors: [
                "Blue", "Green", "Purple", "Orange", "Pink", "Brown", "Black", "White",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            seed: None,
        }
    }
}

/// Reason a tuning value was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidConfig(pub &'static str);

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid game config: {}", self.0)
    }
}

impl GameConfig {
    pub fn arena(&self) -> Arena {
        Arena::new(self.arena.width, self.arena.height)
    }

    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(self.arena.width.is_finite() && self.arena.width > 0.0)
            || !(self.arena.height.is_finite() && self.arena.height > 0.0)
        {
            return Err(InvalidConfig("arena dimensions must be positive"));
        }
        if self.player.lives < 1 {
            return Err(InvalidConfig("players need at least one life"));
        }
        if !self.player.speed.is_finite() || self.player.speed < 0.0 {
            return Err(InvalidConfig("player speed must be non-negative"));
        }
        if !self.enemy.speed.is_finite() || self.enemy.speed <= 0.0 {
            return Err(InvalidConfig("enemy speed must be positive"));
        }
        if self.coin.lifespan_ms == 0 {
            return Err(InvalidConfig("coin lifespan must be positive"));
        }
        for scale in [self.player.scale, self.enemy.scale, self.coin.scale] {
            if !(scale > 0.0 && scale < 1.0) {
                return Err(InvalidConfig("entity scales must be within (0, 1)"));
            }
        }
        if self.player_colors.is_empty() {
            return Err(InvalidConfig("color pool must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_defaults_are_used_then_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.player_colors.len(), 8);
        assert!(!config.projectile.enabled);
    }

    #[test]
    fn when_color_pool_is_empty_then_validation_fails() {
        let config = GameConfig {
            player_colors: Vec::new(),
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn when_lives_are_zero_then_validation_fails() {
        let mut config = GameConfig::default();
        config.player.lives = 0;
        assert_eq!(
            config.validate(),
            Err(InvalidConfig("players need at least one life"))
        );
    }

    #[test]
    fn when_toml_sets_some_fields_then_the_rest_keep_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            spawn_protection_ms = 2500
            seed = 7

            [enemy]
            speed = 12.5
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.spawn_protection_ms, 2500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.enemy.speed, 12.5);
        assert_eq!(config.enemy.spawn_rate_ms, 1000);
        assert_eq!(config.player, PlayerTuning::default());
    }
}
