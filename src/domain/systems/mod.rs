// Pure per-tick systems operating on entity collections.

pub mod collision;
pub mod projectiles;
pub mod spawning;
