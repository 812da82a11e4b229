// Team rosters and the shared display-color pool.

use crate::domain::entities::PeerId;
use crate::domain::errors::LobbyError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Red,
    Blue,
    Spectators,
}

impl Team {
    /// Playing teams put their members into the session's player map.
    pub fn is_playing(self) -> bool {
        !matches!(self, Team::Spectators)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Team::Red => "red",
            Team::Blue => "blue",
            Team::Spectators => "spectators",
        };
        f.write_str(name)
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "red team" => Ok(Team::Red),
            "blue" | "blue team" => Ok(Team::Blue),
            "spectator" | "spectators" => Ok(Team::Spectators),
            other => Err(format!("unknown team `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub peer_id: PeerId,
}

/// Three disjoint, ordered rosters. Always broadcast in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rosters {
    pub red: Vec<RosterEntry>,
    pub blue: Vec<RosterEntry>,
    pub spectators: Vec<RosterEntry>,
}

impl Rosters {
    pub fn roster(&self, team: Team) -> &[RosterEntry] {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
            Team::Spectators => &self.spectators,
        }
    }

    fn roster_mut(&mut self, team: Team) -> &mut Vec<RosterEntry> {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
            Team::Spectators => &mut self.spectators,
        }
    }

    /// Drops the peer from every roster. Returns true if it was listed anywhere.
    pub fn remove(&mut self, peer_id: &str) -> bool {
        let before = self.len();
        for roster in [&mut self.red, &mut self.blue, &mut self.spectators] {
            roster.retain(|entry| entry.peer_id != peer_id);
        }
        before != self.len()
    }

    /// Moves the entry to the end of `team`, leaving every other roster without it.
    pub fn join(&mut self, team: Team, entry: RosterEntry) {
        self.remove(&entry.peer_id);
        self.roster_mut(team).push(entry);
    }

    pub fn team_of(&self, peer_id: &str) -> Option<Team> {
        [Team::Red, Team::Blue, Team::Spectators]
            .into_iter()
            .find(|team| self.roster(*team).iter().any(|e| e.peer_id == peer_id))
    }

    pub fn len(&self) -> usize {
        self.red.len() + self.blue.len() + self.spectators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unclaimed display colors plus the current holder of every claimed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPool {
    available: Vec<String>,
    holders: HashMap<PeerId, String>,
}

impl ColorPool {
    pub fn new(colors: impl IntoIterator<Item = String>) -> Self {
        let mut available: Vec<String> = Vec::new();
        for color in colors {
            if !available.contains(&color) {
                available.push(color);
            }
        }
        Self {
            available,
            holders: HashMap::new(),
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn color_of(&self, holder: &str) -> Option<&str> {
        self.holders.get(holder).map(String::as_str)
    }

    pub fn holder_of(&self, color: &str) -> Option<&PeerId> {
        self.holders
            .iter()
            .find(|(_, held)| held.as_str() == color)
            .map(|(holder, _)| holder)
    }

    /// Takes `color` out of the pool for `holder`. Returns the pool index it occupied.
    ///
    /// Claims are resolved in arrival order: a color already taken is refused, and a holder
    /// keeps the first color it was granted.
    pub fn claim(&mut self, color: &str, holder: &str) -> Result<usize, LobbyError> {
        if self.holders.contains_key(holder) {
            return Err(LobbyError::AlreadyJoined);
        }
        let index = self
            .available
            .iter()
            .position(|c| c == color)
            .ok_or_else(|| LobbyError::ColorUnavailable(color.to_string()))?;
        let color = self.available.remove(index);
        self.holders.insert(holder.to_string(), color);
        Ok(index)
    }

    /// Returns the holder's color to the end of the pool, if it held one.
    pub fn release(&mut self, holder: &str) -> Option<String> {
        let color = self.holders.remove(holder)?;
        self.available.push(color.clone());
        Some(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, peer_id: &str) -> RosterEntry {
        RosterEntry {
            name: name.to_string(),
            peer_id: peer_id.to_string(),
        }
    }

    fn pool() -> ColorPool {
        ColorPool::new(["Blue", "Green", "Purple"].map(String::from))
    }

    #[test]
    fn when_joining_a_second_team_then_entry_moves() {
        let mut rosters = Rosters::default();
        rosters.join(Team::Red, entry("Ann", "a"));
        rosters.join(Team::Blue, entry("Bob", "b"));
        rosters.join(Team::Blue, entry("Ann", "a"));

        assert!(rosters.red.is_empty());
        assert_eq!(rosters.blue, vec![entry("Bob", "b"), entry("Ann", "a")]);
        assert_eq!(rosters.team_of("a"), Some(Team::Blue));
        assert_eq!(rosters.len(), 2);
    }

    #[test]
    fn when_peer_is_removed_then_no_roster_lists_it() {
        let mut rosters = Rosters::default();
        rosters.join(Team::Spectators, entry("Cid", "c"));
        assert!(rosters.remove("c"));
        assert!(!rosters.remove("c"));
        assert_eq!(rosters.team_of("c"), None);
    }

    #[test]
    fn when_team_name_is_parsed_then_aliases_are_accepted() {
        assert_eq!("Red Team".parse::<Team>(), Ok(Team::Red));
        assert_eq!("blue".parse::<Team>(), Ok(Team::Blue));
        assert_eq!("Spectators".parse::<Team>(), Ok(Team::Spectators));
        assert!("green".parse::<Team>().is_err());
    }

    #[test]
    fn when_color_is_claimed_then_it_leaves_the_pool() {
        let mut colors = pool();
        assert_eq!(colors.claim("Green", "a"), Ok(1));
        assert_eq!(colors.available(), ["Blue", "Purple"]);
        assert_eq!(colors.holder_of("Green").map(String::as_str), Some("a"));
        assert_eq!(colors.color_of("a"), Some("Green"));
    }

    #[test]
    fn when_two_peers_claim_the_same_color_then_first_arrival_keeps_it() {
        let mut colors = pool();
        assert_eq!(colors.claim("Blue", "a"), Ok(0));
        assert_eq!(
            colors.claim("Blue", "b"),
            Err(LobbyError::ColorUnavailable("Blue".into()))
        );
        assert_eq!(colors.color_of("a"), Some("Blue"));
        assert_eq!(colors.color_of("b"), None);
    }

    #[test]
    fn when_holder_releases_then_color_returns_exactly_once() {
        let mut colors = pool();
        colors.claim("Purple", "a").expect("claim should succeed");
        assert_eq!(colors.release("a"), Some("Purple".to_string()));
        assert_eq!(colors.release("a"), None);
        let purple = colors
            .available()
            .iter()
            .filter(|c| c.as_str() == "Purple")
            .count();
        assert_eq!(purple, 1);
    }

    #[test]
    fn when_holder_claims_again_then_claim_is_refused() {
        let mut colors = pool();
        colors.claim("Blue", "a").expect("claim should succeed");
        assert_eq!(colors.claim("Green", "a"), Err(LobbyError::AlreadyJoined));
        assert_eq!(colors.available(), ["Green", "Purple"]);
    }
}
