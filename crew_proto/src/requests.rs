use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{seconds, AuthorityError, GameOver, LobbyConfig, Progress};

/// Sentinel vote target meaning "skip".
pub const SKIP_VOTE: &str = "skip";

/// Which state endpoint a poll reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollTarget {
    Player,
    Lobby,
}

impl PollTarget {
    pub fn path(&self) -> &'static str {
        match self {
            PollTarget::Player => "/api/player",
            PollTarget::Lobby => "/api/state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteTarget {
    Player(String),
    Skip,
}

impl VoteTarget {
    pub fn as_wire(&self) -> &str {
        match self {
            VoteTarget::Player(id) => id.as_str(),
            VoteTarget::Skip => SKIP_VOTE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ToggleTask,
    CastVote,
    Kill,
    Report,
    SabotageComms,
    CallEmergency,
    ResetGame,
    SetReady,
    StartGame,
    UpdateConfig,
    KickPlayer,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ToggleTask => "toggle_task",
            ActionKind::CastVote => "cast_vote",
            ActionKind::Kill => "kill",
            ActionKind::Report => "report",
            ActionKind::SabotageComms => "sabotage_comms",
            ActionKind::CallEmergency => "call_emergency",
            ActionKind::ResetGame => "reset_game",
            ActionKind::SetReady => "set_ready",
            ActionKind::StartGame => "start_game",
            ActionKind::UpdateConfig => "update_config",
            ActionKind::KickPlayer => "kick_player",
        }
    }
}

/// One mutating request to the authority. Every variant is a `POST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    ToggleTask {
        task_id: String,
        done: bool,
    },
    CastVote {
        target: VoteTarget,
    },
    Kill {
        target_id: String,
    },
    Report {
        body_id: String,
    },
    SabotageComms,
    CallEmergency,
    ResetGame,
    SetReady {
        ready: bool,
    },
    StartGame,
    UpdateConfig {
        required_players: Option<u32>,
        kill_cooldown: Option<u32>,
    },
    KickPlayer {
        player_id: String,
    },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::ToggleTask { .. } => ActionKind::ToggleTask,
            ActionRequest::CastVote { .. } => ActionKind::CastVote,
            ActionRequest::Kill { .. } => ActionKind::Kill,
            ActionRequest::Report { .. } => ActionKind::Report,
            ActionRequest::SabotageComms => ActionKind::SabotageComms,
            ActionRequest::CallEmergency => ActionKind::CallEmergency,
            ActionRequest::ResetGame => ActionKind::ResetGame,
            ActionRequest::SetReady { .. } => ActionKind::SetReady,
            ActionRequest::StartGame => ActionKind::StartGame,
            ActionRequest::UpdateConfig { .. } => ActionKind::UpdateConfig,
            ActionRequest::KickPlayer { .. } => ActionKind::KickPlayer,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ActionRequest::ToggleTask { .. } => "/api/tasks/complete",
            ActionRequest::CastVote { .. } => "/api/meeting/vote",
            ActionRequest::Kill { .. } => "/api/impostor/kill",
            ActionRequest::Report { .. } => "/api/report",
            ActionRequest::SabotageComms => "/api/impostor/sabotage",
            ActionRequest::CallEmergency => "/api/meeting/emergency",
            ActionRequest::ResetGame => "/api/reset",
            ActionRequest::SetReady { .. } => "/api/ready",
            ActionRequest::StartGame => "/api/start",
            ActionRequest::UpdateConfig { .. } => "/api/lobby/config",
            ActionRequest::KickPlayer { .. } => "/api/lobby/kick",
        }
    }

    /// JSON body, or `None` for body-less posts.
    pub fn body(&self) -> Option<Value> {
        match self {
            ActionRequest::ToggleTask { task_id, done } => {
                Some(json!({ "taskId": task_id, "done": done }))
            }
            ActionRequest::CastVote { target } => Some(json!({ "target": target.as_wire() })),
            ActionRequest::Kill { target_id } => Some(json!({ "targetId": target_id })),
            ActionRequest::Report { body_id } => Some(json!({ "bodyId": body_id })),
            ActionRequest::SetReady { ready } => Some(json!({ "ready": ready })),
            ActionRequest::UpdateConfig {
                required_players,
                kill_cooldown,
            } => {
                let mut body = Map::new();
                if let Some(value) = required_players {
                    body.insert("requiredPlayers".into(), json!(value));
                }
                if let Some(value) = kill_cooldown {
                    body.insert("killCooldown".into(), json!(value));
                }
                Some(Value::Object(body))
            }
            ActionRequest::KickPlayer { player_id } => Some(json!({ "playerId": player_id })),
            ActionRequest::SabotageComms
            | ActionRequest::CallEmergency
            | ActionRequest::ResetGame
            | ActionRequest::StartGame => None,
        }
    }

    /// Decode the success payload matching this request.
    pub fn parse_reply(&self, value: Value) -> Result<ActionReply, AuthorityError> {
        fn typed<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, AuthorityError> {
            serde_json::from_value(value).map_err(|err| AuthorityError::Malformed(err.to_string()))
        }

        Ok(match self.kind() {
            ActionKind::ToggleTask => ActionReply::Task(typed(value)?),
            ActionKind::CastVote => ActionReply::Vote(typed(value)?),
            ActionKind::Kill => ActionReply::Kill(typed(value)?),
            ActionKind::ResetGame | ActionKind::StartGame => ActionReply::Redirect(typed(value)?),
            ActionKind::UpdateConfig => ActionReply::Config(typed(value)?),
            ActionKind::KickPlayer => ActionReply::Kick(typed(value)?),
            ActionKind::Report
            | ActionKind::SabotageComms
            | ActionKind::CallEmergency
            | ActionKind::SetReady => ActionReply::Ack,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TaskReply {
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct VoteReply {
    #[serde(rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct KillReply {
    #[serde(deserialize_with = "seconds::deserialize_opt")]
    pub cooldown: Option<u32>,
    pub game_over: Option<GameOver>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RedirectReply {
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ConfigReply {
    pub config: Option<LobbyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RemovedPlayer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct KickReply {
    pub removed: Option<RemovedPlayer>,
}

/// Decoded success payload of an [`ActionRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReply {
    Task(TaskReply),
    Vote(VoteReply),
    Kill(KillReply),
    Redirect(RedirectReply),
    Config(ConfigReply),
    Kick(KickReply),
    Ack,
}
