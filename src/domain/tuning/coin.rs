use serde::Deserialize;

/// Gameplay tuning for collectible coins.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoinTuning {
    /// Minimum milliseconds between two spawns.
    pub spawn_rate_ms: u64,

    /// Time for the shrink animation to reach zero size.
    pub lifespan_ms: u64,

    /// Absolute age after which a coin is removed, whatever its size.
    pub max_age_ms: u64,

    /// Spacing between size recomputations when throttled shrinking is on.
    pub shrink_interval_ms: u64,

    /// Edge length as a fraction of the arena's shorter side.
    pub scale: f32,
}

impl Default for CoinTuning {
    fn default() -> Self {
        Self {
            spawn_rate_ms: 1000,
            lifespan_ms: 5000,
            max_age_ms: 3000,
            shrink_interval_ms: 1000,
            scale: 0.015,
        }
    }
}
