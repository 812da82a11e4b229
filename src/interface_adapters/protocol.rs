// Wire protocol DTOs and conversions for the host <-> peer message catalogue.
// Every message is a JSON object tagged by its catalogue name in `type`.

use crate::domain::{
    CoinSnapshot, ControlFlags, Direction, EnemySnapshot, PlayerRecord, ProjectileSnapshot,
    RosterEntry, Rosters, Snapshot,
};
use crate::use_cases::{HostNotice, PeerRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the host sends to connected peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "initial_data")]
    InitialData(InitialDataDto),
    #[serde(rename = "start game with 0 players")]
    StartRejected,
    #[serde(rename = "team_update")]
    TeamUpdate(RostersDto),
    #[serde(rename = "color used")]
    ColorUsed { color: String, index: usize },
    #[serde(rename = "color available")]
    ColorAvailable { color: String },
    #[serde(rename = "playerReady")]
    PlayerReady { player: PlayerDto },
    #[serde(rename = "gameState")]
    GameState(GameStateDto),
    #[serde(rename = "gameStarted!")]
    GameStarted,
    #[serde(rename = "gameRestarting")]
    GameRestarting,
    #[serde(rename = "gameOver")]
    GameOver { players: BTreeMap<String, PlayerDto> },
    #[serde(rename = "showGameModal")]
    ShowGameModal,
    #[serde(rename = "player left")]
    PlayerLeft { player: PeerRefDto },
}

/// Messages peers send to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "initial_data_request")]
    InitialDataRequest,
    #[serde(rename = "pause clicked")]
    PauseClicked,
    #[serde(rename = "team_update")]
    TeamUpdate(RostersDto),
    #[serde(rename = "set_gameInstance_player")]
    SetPlayer { player: PlayerDto },
    #[serde(rename = "remove_gameInstance_player")]
    RemovePlayer { player: PlayerDto },
    #[serde(rename = "client used color")]
    UsedColor {
        color: String,
        #[serde(alias = "selectedIndex")]
        index: usize,
    },
    #[serde(rename = "userInput")]
    UserInput { id: String, commands: CommandsDto },
    #[serde(rename = "playerReady")]
    PlayerReady { player: PlayerDto },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialDataDto {
    #[serde(flatten)]
    pub rosters: RostersDto,
    #[serde(rename = "isPaused")]
    pub is_paused: bool,
    #[serde(rename = "availableColors")]
    pub available_colors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RostersDto {
    #[serde(default)]
    pub red_team: Vec<RosterEntryDto>,
    #[serde(default)]
    pub blue_team: Vec<RosterEntryDto>,
    #[serde(default)]
    pub spectators: Vec<RosterEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntryDto {
    pub name: String,
    pub peer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRefDto {
    pub id: String,
}

/// Player record as exchanged on the wire. Missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
    pub lives: i32,
    pub score: u32,
    pub ready: bool,
    pub color: Option<String>,
    pub has_joined_team: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsDto {
    pub left: bool,
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub action: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateDto {
    #[serde(default)]
    pub tick: u64,
    pub players: BTreeMap<String, PlayerDto>,
    pub enemies: Vec<EnemyDto>,
    pub coins: Vec<CoinDto>,
    // Projectiles keep their historical wire name.
    #[serde(default)]
    pub missile: Vec<MissileDto>,
    pub paused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDto {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDto {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionDto {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissileDto {
    pub x: f32,
    pub y: f32,
    pub direction: DirectionDto,
    pub owner_id: String,
}

// ---- domain -> wire ----

impl From<&RosterEntry> for RosterEntryDto {
    fn from(e: &RosterEntry) -> Self {
        Self {
            name: e.name.clone(),
            peer_id: e.peer_id.clone(),
        }
    }
}

impl From<RosterEntryDto> for RosterEntry {
    fn from(e: RosterEntryDto) -> Self {
        Self {
            name: e.name,
            peer_id: e.peer_id,
        }
    }
}

impl From<&Rosters> for RostersDto {
    fn from(r: &Rosters) -> Self {
        Self {
            red_team: r.red.iter().map(Into::into).collect(),
            blue_team: r.blue.iter().map(Into::into).collect(),
            spectators: r.spectators.iter().map(Into::into).collect(),
        }
    }
}

impl From<RostersDto> for Rosters {
    fn from(r: RostersDto) -> Self {
        Self {
            red: r.red_team.into_iter().map(Into::into).collect(),
            blue: r.blue_team.into_iter().map(Into::into).collect(),
            spectators: r.spectators.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&PlayerRecord> for PlayerDto {
    fn from(p: &PlayerRecord) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
            width: p.width,
            height: p.height,
            lives: p.lives,
            score: p.score,
            ready: p.ready,
            color: p.color.clone(),
            has_joined_team: p.has_joined_team,
        }
    }
}

impl From<PlayerDto> for PlayerRecord {
    fn from(p: PlayerDto) -> Self {
        Self {
            id: p.id,
            name: p.name,
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
            width: p.width,
            height: p.height,
            lives: p.lives,
            score: p.score,
            ready: p.ready,
            color: p.color,
            has_joined_team: p.has_joined_team,
        }
    }
}

impl From<Direction> for DirectionDto {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => DirectionDto::Up,
            Direction::Down => DirectionDto::Down,
            Direction::Left => DirectionDto::Left,
            Direction::Right => DirectionDto::Right,
        }
    }
}

impl From<DirectionDto> for Direction {
    fn from(d: DirectionDto) -> Self {
        match d {
            DirectionDto::Up => Direction::Up,
            DirectionDto::Down => Direction::Down,
            DirectionDto::Left => Direction::Left,
            DirectionDto::Right => Direction::Right,
        }
    }
}

fn players_to_wire(players: &BTreeMap<String, PlayerRecord>) -> BTreeMap<String, PlayerDto> {
    players
        .iter()
        .map(|(id, p)| (id.clone(), PlayerDto::from(p)))
        .collect()
}

fn players_from_wire(players: BTreeMap<String, PlayerDto>) -> BTreeMap<String, PlayerRecord> {
    players
        .into_iter()
        .map(|(id, p)| (id, PlayerRecord::from(p)))
        .collect()
}

impl From<&Snapshot> for GameStateDto {
    fn from(s: &Snapshot) -> Self {
        Self {
            tick: s.tick,
            players: players_to_wire(&s.players),
            enemies: s
                .enemies
                .iter()
                .map(|e| EnemyDto {
                    x: e.x,
                    y: e.y,
                    dx: e.dx,
                    dy: e.dy,
                    width: e.width,
                    height: e.height,
                })
                .collect(),
            coins: s
                .coins
                .iter()
                .map(|c| CoinDto {
                    x: c.x,
                    y: c.y,
                    width: c.width,
                    height: c.height,
                })
                .collect(),
            missile: s
                .projectiles
                .iter()
                .map(|p| MissileDto {
                    x: p.x,
                    y: p.y,
                    direction: p.direction.into(),
                    owner_id: p.owner_id.clone(),
                })
                .collect(),
            paused: s.paused,
        }
    }
}

impl From<GameStateDto> for Snapshot {
    fn from(s: GameStateDto) -> Self {
        Self {
            tick: s.tick,
            players: players_from_wire(s.players),
            enemies: s
                .enemies
                .into_iter()
                .map(|e| EnemySnapshot {
                    x: e.x,
                    y: e.y,
                    dx: e.dx,
                    dy: e.dy,
                    width: e.width,
                    height: e.height,
                })
                .collect(),
            coins: s
                .coins
                .into_iter()
                .map(|c| CoinSnapshot {
                    x: c.x,
                    y: c.y,
                    width: c.width,
                    height: c.height,
                })
                .collect(),
            projectiles: s
                .missile
                .into_iter()
                .map(|m| ProjectileSnapshot {
                    x: m.x,
                    y: m.y,
                    direction: m.direction.into(),
                    owner_id: m.owner_id,
                })
                .collect(),
            paused: s.paused,
        }
    }
}

impl From<ControlFlags> for CommandsDto {
    fn from(f: ControlFlags) -> Self {
        Self {
            left: f.left,
            up: f.up,
            right: f.right,
            down: f.down,
            action: f.action,
        }
    }
}

impl From<CommandsDto> for ControlFlags {
    fn from(c: CommandsDto) -> Self {
        Self {
            left: c.left,
            up: c.up,
            right: c.right,
            down: c.down,
            action: c.action,
        }
    }
}

impl From<&HostNotice> for ServerMessage {
    fn from(notice: &HostNotice) -> Self {
        match notice {
            HostNotice::InitialData {
                rosters,
                paused,
                available_colors,
            } => ServerMessage::InitialData(InitialDataDto {
                rosters: rosters.into(),
                is_paused: *paused,
                available_colors: available_colors.clone(),
            }),
            HostNotice::StartRejected => ServerMessage::StartRejected,
            HostNotice::TeamUpdate(rosters) => ServerMessage::TeamUpdate(rosters.into()),
            HostNotice::ColorUsed { color, index } => ServerMessage::ColorUsed {
                color: color.clone(),
                index: *index,
            },
            HostNotice::ColorAvailable { color } => ServerMessage::ColorAvailable {
                color: color.clone(),
            },
            HostNotice::PlayerReady(record) => ServerMessage::PlayerReady {
                player: record.into(),
            },
            HostNotice::GameState(snapshot) => ServerMessage::GameState(snapshot.into()),
            HostNotice::GameStarted => ServerMessage::GameStarted,
            HostNotice::GameRestarting => ServerMessage::GameRestarting,
            HostNotice::GameOver { players } => ServerMessage::GameOver {
                players: players_to_wire(players),
            },
            HostNotice::ShowGameModal => ServerMessage::ShowGameModal,
            HostNotice::PlayerLeft { id } => ServerMessage::PlayerLeft {
                player: PeerRefDto { id: id.clone() },
            },
        }
    }
}

impl From<ServerMessage> for HostNotice {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::InitialData(data) => HostNotice::InitialData {
                rosters: data.rosters.into(),
                paused: data.is_paused,
                available_colors: data.available_colors,
            },
            ServerMessage::StartRejected => HostNotice::StartRejected,
            ServerMessage::TeamUpdate(rosters) => HostNotice::TeamUpdate(rosters.into()),
            ServerMessage::ColorUsed { color, index } => HostNotice::ColorUsed { color, index },
            ServerMessage::ColorAvailable { color } => HostNotice::ColorAvailable { color },
            ServerMessage::PlayerReady { player } => HostNotice::PlayerReady(player.into()),
            ServerMessage::GameState(state) => HostNotice::GameState(state.into()),
            ServerMessage::GameStarted => HostNotice::GameStarted,
            ServerMessage::GameRestarting => HostNotice::GameRestarting,
            ServerMessage::GameOver { players } => HostNotice::GameOver {
                players: players_from_wire(players),
            },
            ServerMessage::ShowGameModal => HostNotice::ShowGameModal,
            ServerMessage::PlayerLeft { player } => HostNotice::PlayerLeft { id: player.id },
        }
    }
}

impl From<ClientMessage> for PeerRequest {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::InitialDataRequest => PeerRequest::InitialDataRequest,
            ClientMessage::PauseClicked => PeerRequest::PauseClicked,
            ClientMessage::TeamUpdate(rosters) => PeerRequest::TeamUpdate(rosters.into()),
            ClientMessage::SetPlayer { player } => PeerRequest::SetPlayer(player.into()),
            ClientMessage::RemovePlayer { player } => PeerRequest::RemovePlayer(player.into()),
            ClientMessage::UsedColor { color, index } => PeerRequest::UsedColor { color, index },
            ClientMessage::UserInput { id, commands } => PeerRequest::UserInput {
                id,
                flags: commands.into(),
            },
            ClientMessage::PlayerReady { player } => PeerRequest::PlayerReady(player.into()),
        }
    }
}

impl From<&PeerRequest> for ClientMessage {
    fn from(request: &PeerRequest) -> Self {
        match request {
            PeerRequest::InitialDataRequest => ClientMessage::InitialDataRequest,
            PeerRequest::PauseClicked => ClientMessage::PauseClicked,
            PeerRequest::TeamUpdate(rosters) => ClientMessage::TeamUpdate(rosters.into()),
            PeerRequest::SetPlayer(record) => ClientMessage::SetPlayer {
                player: record.into(),
            },
            PeerRequest::RemovePlayer(record) => ClientMessage::RemovePlayer {
                player: record.into(),
            },
            PeerRequest::UsedColor { color, index } => ClientMessage::UsedColor {
                color: color.clone(),
                index: *index,
            },
            PeerRequest::UserInput { id, flags } => ClientMessage::UserInput {
                id: id.clone(),
                commands: (*flags).into(),
            },
            PeerRequest::PlayerReady(record) => ClientMessage::PlayerReady {
                player: record.into(),
            },
        }
    }
}
