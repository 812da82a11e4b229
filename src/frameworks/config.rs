use crate::domain::{GameConfig, Team};
use std::{env, fmt, path::Path, time::Duration};

// Runtime/server constants (not gameplay tuning).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Host,
    Peer,
}

pub fn mode() -> Mode {
    match env::var("ARENA_MODE").as_deref().map(str::trim) {
        Ok("peer") => Mode::Peer,
        _ => Mode::Host,
    }
}

pub fn http_port() -> u16 {
    env::var("ARENA_HOST_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn bind_addr() -> String {
    env::var("ARENA_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn host_url() -> String {
    env::var("ARENA_HOST_URL").unwrap_or_else(|_| format!("ws://127.0.0.1:{}", http_port()))
}

pub fn lobby_code() -> Option<String> {
    env::var("ARENA_LOBBY_CODE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn player_name() -> String {
    env::var("ARENA_PLAYER_NAME").unwrap_or_else(|_| "Player".to_string())
}

// Team the local participant joins on startup. Unset means the host only serves.
pub fn team() -> Option<Team> {
    env::var("ARENA_TEAM").ok().and_then(|v| v.parse().ok())
}

// Peer mode: ask the host to start the match right after joining.
pub fn autostart() -> bool {
    matches!(env::var("ARENA_AUTOSTART").as_deref(), Ok("1") | Ok("true"))
}

pub fn game_config_path() -> Option<String> {
    env::var("ARENA_GAME_CONFIG").ok()
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const PEER_OUTBOUND_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
// Coarse poll while waiting for the first player to register.
pub const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read game config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse game config: {e}"),
            ConfigError::Invalid(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parses and validates TOML tuning. Omitted fields keep their defaults.
pub fn parse_game_config(raw: &str) -> Result<GameConfig, ConfigError> {
    let config: GameConfig = toml::from_str(raw).map_err(ConfigError::Parse)?;
    config
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(config)
}

pub fn load_game_config(path: Option<&Path>) -> Result<GameConfig, ConfigError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_game_config(&raw)
        }
        None => Ok(GameConfig::default()),
    }
}
