// Domain layer: core simulation types and rules.

pub mod entities;
pub mod errors;
pub mod geometry;
pub mod ports;
pub mod state;
pub mod systems;
pub mod teams;
pub mod tuning;

pub use entities::{
    Coin, CoinSettings, ControlFlags, Direction, Edge, Enemy, PeerId, Player, Projectile,
};
pub use errors::{LobbyError, SessionError};
pub use geometry::{Arena, Bounded, Rect};
pub use ports::{Clock, Scheduler};
pub use state::{CoinSnapshot, EnemySnapshot, PlayerRecord, ProjectileSnapshot, Snapshot};
pub use teams::{ColorPool, RosterEntry, Rosters, Team};
pub use tuning::GameConfig;
