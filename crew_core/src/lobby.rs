use serde::Serialize;
use thiserror::Error;

use crew_proto::{ConfigBounds, ConfigLimits, GameStatus, LobbyConfig, LobbyPlayer, LobbySnapshot};

/// Derived lobby screen state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyView {
    pub code: String,
    pub round: u32,
    pub players: Vec<LobbyPlayer>,
    pub player_count: u32,
    pub required_players: u32,
    pub ready_count: u32,
    pub me_id: Option<String>,
    pub me_ready: bool,
    pub is_leader: bool,
    pub leader_name: Option<String>,
    pub everyone_ready: bool,
    pub can_start: bool,
    pub status_message: String,
    pub config: LobbyConfig,
    pub limits: ConfigLimits,
    pub game_started: bool,
}

impl Default for LobbyView {
    fn default() -> Self {
        reduce_lobby(&LobbySnapshot::default())
    }
}

pub fn reduce_lobby(snapshot: &LobbySnapshot) -> LobbyView {
    let me = snapshot.me();
    let player_count = if snapshot.player_count > 0 {
        snapshot.player_count
    } else {
        snapshot.players.len() as u32
    };
    let ready_count = snapshot.players.iter().filter(|p| p.ready).count() as u32;
    let is_leader = me
        .map(|player| player.leader || snapshot.leader_id.as_deref() == Some(player.id.as_str()))
        .unwrap_or(false);

    LobbyView {
        code: snapshot.code.clone(),
        round: snapshot.round,
        players: snapshot.players.clone(),
        player_count,
        required_players: snapshot.required_players,
        ready_count,
        me_id: me.map(|player| player.id.clone()),
        me_ready: me.map(|player| player.ready).unwrap_or(false),
        is_leader,
        leader_name: snapshot.leader_name.clone(),
        everyone_ready: snapshot.everyone_ready,
        can_start: snapshot.can_start,
        status_message: status_message(player_count, snapshot.required_players, snapshot.everyone_ready),
        config: snapshot.config,
        limits: snapshot.config_limits,
        game_started: snapshot.status == GameStatus::InGame,
    }
}

fn status_message(player_count: u32, required: u32, everyone_ready: bool) -> String {
    if player_count < required {
        let missing = required - player_count;
        format!("Waiting for {missing} more player(s) (minimum {required}).")
    } else if !everyone_ready {
        "Not everyone is ready yet.".to_string()
    } else {
        "Everyone is ready! Anyone can start.".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigBoundsError {
    #[error("required players must be between {min} and {max} (got {value})")]
    RequiredPlayers { value: u32, min: u32, max: u32 },
    #[error("kill cooldown must be between {min} and {max} seconds (got {value})")]
    KillCooldown { value: u32, min: u32, max: u32 },
    #[error("nothing to update")]
    Empty,
}

/// Check a config edit against the lobby's advertised limits.
pub fn validate_config(
    limits: &ConfigLimits,
    required_players: Option<u32>,
    kill_cooldown: Option<u32>,
) -> Result<(), ConfigBoundsError> {
    if required_players.is_none() && kill_cooldown.is_none() {
        return Err(ConfigBoundsError::Empty);
    }
    if let Some(value) = required_players {
        check(limits.required_players, value).map_err(|ConfigBounds { min, max }| {
            ConfigBoundsError::RequiredPlayers { value, min, max }
        })?;
    }
    if let Some(value) = kill_cooldown {
        check(limits.kill_cooldown, value).map_err(|ConfigBounds { min, max }| {
            ConfigBoundsError::KillCooldown { value, min, max }
        })?;
    }
    Ok(())
}

fn check(bounds: ConfigBounds, value: u32) -> Result<(), ConfigBounds> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(bounds)
    }
}
