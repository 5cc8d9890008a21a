//! Wire contracts exchanged with the crewlink game authority.
//!
//! Every payload is JSON. Field names follow the authority's camelCase
//! convention; optional or missing fields fall back to neutral defaults so a
//! partially populated snapshot still decodes.

use serde::{Deserialize, Serialize};

mod lobby;
mod reply;
mod requests;
pub mod seconds;

pub use lobby::{ConfigBounds, ConfigLimits, LobbyConfig, LobbyPlayer, LobbySnapshot};
pub use reply::{decode_envelope, AuthorityError, Rejection};
pub use requests::{
    ActionKind, ActionReply, ActionRequest, ConfigReply, KickReply, KillReply, PollTarget,
    RedirectReply, RemovedPlayer, TaskReply, VoteReply, VoteTarget, SKIP_VOTE,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Lobby,
    InGame,
    Meeting,
    Ended,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Lobby => "lobby",
            GameStatus::InGame => "in_game",
            GameStatus::Meeting => "meeting",
            GameStatus::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Crewmate,
    Impostor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRole {
    Medic,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TaskItem {
    pub id: String,
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Common,
    Long,
    Fast,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 3] = [TaskCategory::Common, TaskCategory::Long, TaskCategory::Fast];

    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Common => "Common",
            TaskCategory::Long => "Long",
            TaskCategory::Fast => "Fast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TaskLists {
    pub common: Vec<TaskItem>,
    pub long: Vec<TaskItem>,
    pub fast: Vec<TaskItem>,
}

impl TaskLists {
    pub fn category(&self, category: TaskCategory) -> &[TaskItem] {
        match category {
            TaskCategory::Common => &self.common,
            TaskCategory::Long => &self.long,
            TaskCategory::Fast => &self.fast,
        }
    }

    /// Iterate every task in display order (common, long, fast).
    pub fn iter(&self) -> impl Iterator<Item = &TaskItem> {
        self.common.iter().chain(self.long.iter()).chain(self.fast.iter())
    }

    pub fn find(&self, task_id: &str) -> Option<&TaskItem> {
        self.iter().find(|task| task.id == task_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Progress {
    pub total: u32,
    pub completed: u32,
    pub current: f64,
    #[serde(alias = "revealed")]
    pub revealed_ratio: f64,
}

impl Progress {
    /// Revealed ratio clamped into `[0, 1]`; non-finite values read as zero.
    pub fn revealed(&self) -> f64 {
        if self.revealed_ratio.is_finite() {
            self.revealed_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PlayerCard {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DeadPlayer {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub reported: bool,
    pub left_game: bool,
    pub killed_at: Option<f64>,
    pub killed_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetingVoter {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    #[default]
    Report,
    Emergency,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    #[serde(alias = "caller")]
    pub reporter: Option<String>,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub ends_in: u32,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub voting_starts_in: u32,
    pub alive_players: Vec<MeetingVoter>,
    pub my_vote: Option<String>,
    pub deceased: Vec<PlayerCard>,
    pub reported_body: Option<PlayerCard>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingOutcome {
    Ejected,
    Skipped,
    #[default]
    NoVotes,
    NoElimination,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct VoteTally {
    pub target: Option<String>,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EjectedPlayer {
    pub id: String,
    pub name: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetingSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    pub outcome: MeetingOutcome,
    pub ejected: Option<EjectedPlayer>,
    pub game_over: Option<GameOver>,
    pub votes: Vec<VoteTally>,
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    #[default]
    #[serde(alias = "crewmate")]
    Crewmates,
    #[serde(alias = "impostors")]
    Impostor,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GameOver {
    pub winner: Winner,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub impostor: Option<PlayerRef>,
}

impl GameOver {
    /// Banner text: the authority's message when present, otherwise one
    /// derived from the winner and the reported impostor.
    pub fn headline(&self) -> String {
        if let Some(message) = self.message.as_deref().filter(|text| !text.trim().is_empty()) {
            return message.to_string();
        }
        let impostor = self.impostor.as_ref().map(|player| player.name.as_str());
        match (self.winner, impostor) {
            (Winner::Crewmates, Some(name)) => format!("Crewmates win! {name} was the impostor."),
            (Winner::Crewmates, None) => "Crewmates win!".to_string(),
            (Winner::Impostor, Some(name)) => format!("The impostor {name} wins!"),
            (Winner::Impostor, None) => "The impostor wins!".to_string(),
            (Winner::Other, _) => "Game over.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CommsSabotage {
    pub active: bool,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct VitalsEntry {
    pub name: String,
    pub alive: bool,
    pub left_game: bool,
}

/// Authoritative per-player state returned by each player-state poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub status: GameStatus,
    pub name: String,
    pub lobby_code: Option<String>,
    pub role: Option<Role>,
    pub special_role: Option<SpecialRole>,
    pub alive: bool,
    pub is_leader: bool,
    pub tasks: TaskLists,
    pub progress: Progress,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub kill_remaining: u32,
    pub kill_targets: Vec<PlayerCard>,
    pub dead_players: Vec<DeadPlayer>,
    pub meeting: Option<Meeting>,
    pub meeting_summary: Option<MeetingSummary>,
    pub game_over: Option<GameOver>,
    pub comms_sabotage: CommsSabotage,
    pub emergency_available: bool,
    pub vitals: Option<Vec<VitalsEntry>>,
    pub death_note: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            status: GameStatus::Lobby,
            name: String::new(),
            lobby_code: None,
            role: None,
            special_role: None,
            alive: true,
            is_leader: false,
            tasks: TaskLists::default(),
            progress: Progress::default(),
            kill_remaining: 0,
            kill_targets: Vec::new(),
            dead_players: Vec::new(),
            meeting: None,
            meeting_summary: None,
            game_over: None,
            comms_sabotage: CommsSabotage::default(),
            emergency_available: false,
            vitals: None,
            death_note: None,
        }
    }
}

impl Snapshot {
    /// Role with the lobby-time `null` read as crewmate.
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

pub fn encode_snapshot_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

pub fn decode_snapshot_json(data: &str) -> serde_json::Result<Snapshot> {
    serde_json::from_str(data)
}

/// Decode a player-state payload that already passed envelope checks.
pub fn decode_snapshot(value: serde_json::Value) -> Result<Snapshot, AuthorityError> {
    serde_json::from_value(value).map_err(|err| AuthorityError::Malformed(err.to_string()))
}

pub fn decode_lobby(value: serde_json::Value) -> Result<LobbySnapshot, AuthorityError> {
    serde_json::from_value(value).map_err(|err| AuthorityError::Malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_authority_player_view() {
        let payload = r#"{
            "ok": true,
            "name": "Ana",
            "role": "impostor",
            "status": "meeting",
            "alive": true,
            "isLeader": false,
            "tasks": {"common": [{"id": "common:1", "name": "Scan ID card", "done": false}]},
            "killRemaining": 12,
            "progress": {"total": 10, "completed": 4, "current": 0.4, "revealed": 0.2},
            "meeting": {"id": "m1", "caller": "p3", "endsIn": 140, "alivePlayers": [], "myVote": null}
        }"#;
        let snapshot = decode_snapshot_json(payload).expect("payload decodes");
        assert_eq!(snapshot.status, GameStatus::Meeting);
        assert_eq!(snapshot.role(), Role::Impostor);
        assert_eq!(snapshot.kill_remaining, 12);
        assert_eq!(snapshot.tasks.common.len(), 1);
        assert!((snapshot.progress.revealed() - 0.2).abs() < f64::EPSILON);
        let meeting = snapshot.meeting.expect("meeting present");
        assert_eq!(meeting.reporter.as_deref(), Some("p3"));
        assert_eq!(meeting.kind, MeetingKind::Report);
        assert_eq!(meeting.ends_in, 140);
        assert_eq!(meeting.voting_starts_in, 0);
    }

    #[test]
    fn null_counters_and_role_fall_back_to_defaults() {
        let snapshot =
            decode_snapshot_json(r#"{"status": "lobby", "role": null, "killRemaining": null}"#)
                .expect("payload decodes");
        assert_eq!(snapshot.role(), Role::Crewmate);
        assert_eq!(snapshot.kill_remaining, 0);
        assert!(snapshot.alive);
        assert!(snapshot.kill_targets.is_empty());
    }

    #[test]
    fn revealed_ratio_accepts_both_spellings() {
        let a: Progress = serde_json::from_str(r#"{"total": 4, "revealedRatio": 0.5}"#).unwrap();
        let b: Progress = serde_json::from_str(r#"{"total": 4, "revealed": 0.5}"#).unwrap();
        assert_eq!(a, b);
        let wild = Progress {
            revealed_ratio: 3.0,
            ..Progress::default()
        };
        assert_eq!(wild.revealed(), 1.0);
    }

    #[test]
    fn summary_with_game_over_decodes() {
        let payload = r#"{
            "id": "m1",
            "outcome": "ejected",
            "ejected": {"id": "p2", "name": "Rui", "role": "impostor"},
            "votes": [{"target": "p2", "label": "Rui", "count": 3}],
            "gameOver": {"winner": "crewmates", "reason": "impostor_ejected", "impostor": {"id": "p2", "name": "Rui"}}
        }"#;
        let summary: MeetingSummary = serde_json::from_str(payload).unwrap();
        assert_eq!(summary.outcome, MeetingOutcome::Ejected);
        let over = summary.game_over.expect("game over attached");
        assert_eq!(over.winner, Winner::Crewmates);
        assert_eq!(over.headline(), "Crewmates win! Rui was the impostor.");
    }

    #[test]
    fn unknown_outcome_is_preserved_as_other() {
        let summary: MeetingSummary =
            serde_json::from_str(r#"{"id": "m9", "outcome": "tie_break"}"#).unwrap();
        assert_eq!(summary.outcome, MeetingOutcome::Other);
    }
}
