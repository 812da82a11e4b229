use serde::Deserialize;

/// Gameplay tuning for player-controlled squares.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Lives granted on join and on every restart.
    pub lives: i32,

    /// Pixels moved per tick along each held direction.
    pub speed: f32,

    /// Edge length as a fraction of the arena's shorter side.
    pub scale: f32,

    /// When set, players with no lives left keep moving (but never score or take hits).
    pub allow_ghosts: bool,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            lives: 3,
            speed: 15.0,
            scale: 0.05,
            allow_ghosts: true,
        }
    }
}
