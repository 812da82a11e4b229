// Control surface for an automated agent driving the host-local player.

use crate::domain::{ControlFlags, Snapshot};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKey {
    Left,
    Right,
    Up,
    Down,
}

/// Press or release of one directional key, e.g. `"left"` or `"stop left"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentCommand {
    pub key: AgentKey,
    pub pressed: bool,
}

impl AgentCommand {
    pub fn apply(self, flags: &mut ControlFlags) {
        let slot = match self.key {
            AgentKey::Left => &mut flags.left,
            AgentKey::Right => &mut flags.right,
            AgentKey::Up => &mut flags.up,
            AgentKey::Down => &mut flags.down,
        };
        *slot = self.pressed;
    }
}

impl FromStr for AgentCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, pressed) = match s.strip_prefix("stop ") {
            Some(rest) => (rest.trim(), false),
            None => (s, true),
        };
        let key = match name {
            "left" => AgentKey::Left,
            "right" => AgentKey::Right,
            "up" => AgentKey::Up,
            "down" => AgentKey::Down,
            other => return Err(format!("unknown action `{other}`")),
        };
        Ok(Self { key, pressed })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPlayer {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub score: u32,
    pub lives: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentEnemy {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentCoin {
    pub x: f32,
    pub y: f32,
}

/// Reduced per-tick state from the local player's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub player: AgentPlayer,
    pub enemies: Vec<AgentEnemy>,
    pub coins: Vec<AgentCoin>,
    pub paused: bool,
}

impl AgentView {
    /// None while `player_id` is not part of the match.
    pub fn from_snapshot(snapshot: &Snapshot, player_id: &str) -> Option<Self> {
        let p = snapshot.players.get(player_id)?;
        Some(Self {
            player: AgentPlayer {
                x: p.x,
                y: p.y,
                dx: p.dx,
                dy: p.dy,
                score: p.score,
                lives: p.lives,
            },
            enemies: snapshot
                .enemies
                .iter()
                .map(|e| AgentEnemy {
                    x: e.x,
                    y: e.y,
                    dx: e.dx,
                    dy: e.dy,
                })
                .collect(),
            coins: snapshot
                .coins
                .iter()
                .map(|c| AgentCoin { x: c.x, y: c.y })
                .collect(),
            paused: snapshot.paused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_action_has_stop_prefix_then_key_is_released() {
        let cmd: AgentCommand = "stop left".parse().expect("valid action");
        assert_eq!(
            cmd,
            AgentCommand {
                key: AgentKey::Left,
                pressed: false
            }
        );
        let cmd: AgentCommand = "down".parse().expect("valid action");
        assert!(cmd.pressed);
        assert!("jump".parse::<AgentCommand>().is_err());
        assert!("stop".parse::<AgentCommand>().is_err());
    }

    #[test]
    fn when_command_is_applied_then_only_its_flag_changes() {
        let mut flags = ControlFlags {
            up: true,
            ..ControlFlags::default()
        };
        "right".parse::<AgentCommand>().expect("valid").apply(&mut flags);
        "stop up".parse::<AgentCommand>().expect("valid").apply(&mut flags);
        assert_eq!(
            flags,
            ControlFlags {
                right: true,
                ..ControlFlags::default()
            }
        );
    }
}
