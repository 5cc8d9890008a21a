use serde::{Deserialize, Serialize};

use crate::GameStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub id: String,
    pub name: String,
    pub ready: bool,
    #[serde(alias = "is_me")]
    pub is_me: bool,
    pub alive: bool,
    pub leader: bool,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LobbyConfig {
    pub required_players: u32,
    pub kill_cooldown: u32,
    pub impostors: u32,
    pub meeting_duration: u32,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            required_players: 2,
            kill_cooldown: 120,
            impostors: 1,
            meeting_duration: 150,
        }
    }
}

/// Inclusive bounds for an editable lobby setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigBounds {
    pub min: u32,
    pub max: u32,
}

impl ConfigBounds {
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max.max(self.min))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigLimits {
    pub required_players: ConfigBounds,
    pub kill_cooldown: ConfigBounds,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            required_players: ConfigBounds { min: 2, max: 15 },
            kill_cooldown: ConfigBounds { min: 10, max: 600 },
        }
    }
}

/// Payload of the lobby-state poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub code: String,
    pub status: GameStatus,
    pub round: u32,
    pub player_count: u32,
    pub required_players: u32,
    pub everyone_ready: bool,
    pub can_start: bool,
    pub players: Vec<LobbyPlayer>,
    pub leader_id: Option<String>,
    pub leader_name: Option<String>,
    pub config: LobbyConfig,
    pub config_limits: ConfigLimits,
}

impl LobbySnapshot {
    pub fn me(&self) -> Option<&LobbyPlayer> {
        self.players.iter().find(|player| player.is_me)
    }
}
