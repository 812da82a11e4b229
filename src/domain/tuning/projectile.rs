use serde::Deserialize;

/// Gameplay tuning for projectiles.
///
/// Projectiles are off by default; the session only fires and moves them when `enabled` is set.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub enabled: bool,

    /// Pixels travelled per tick.
    pub speed: f32,

    /// Minimum milliseconds between two volleys from the same player.
    pub cooldown_ms: u64,

    /// Edge length of the square hit box in pixels.
    pub size: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 40.0,
            cooldown_ms: 100,
            size: 5.0,
        }
    }
}
