use serde::Deserialize;

/// Gameplay tuning for roaming enemies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Minimum milliseconds between two spawns.
    pub spawn_rate_ms: u64,

    /// Pixels travelled per tick.
    pub speed: f32,

    /// Edge length as a fraction of the arena's shorter side.
    pub scale: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            spawn_rate_ms: 1000,
            speed: 10.0,
            scale: 0.03,
        }
    }
}
