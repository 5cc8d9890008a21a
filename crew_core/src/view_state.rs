use serde::Serialize;

use crew_proto::{
    CommsSabotage, DeadPlayer, GameOver, GameStatus, Meeting, MeetingSummary, PlayerCard,
    Progress, Role, TaskCategory, TaskItem, VitalsEntry,
};

use crate::capabilities::Capabilities;

pub const EMPTY_TASKS_PLACEHOLDER: &str = "No tasks assigned.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup {
    #[serde(skip)]
    pub category: TaskCategory,
    pub label: &'static str,
    pub items: Vec<TaskItem>,
}

impl TaskGroup {
    pub fn placeholder(&self) -> Option<&'static str> {
        self.items.is_empty().then_some(EMPTY_TASKS_PLACEHOLDER)
    }
}

/// Derived, role-gated projection of one snapshot.
///
/// Only produced by [`crate::reducer::reduce`]; the session swaps it in whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub status: GameStatus,
    pub player_name: String,
    pub lobby_code: Option<String>,
    pub role: Role,
    pub role_label: &'static str,
    pub role_hint: &'static str,
    pub is_impostor: bool,
    pub is_alive: bool,
    pub is_leader: bool,
    pub is_medic: bool,
    pub capabilities: Capabilities,
    pub tasks: Vec<TaskGroup>,
    pub progress: Progress,
    pub kill_remaining: u32,
    pub kill_targets: Vec<PlayerCard>,
    pub reportable_bodies: Vec<DeadPlayer>,
    pub dead_players: Vec<DeadPlayer>,
    pub meeting: Option<Meeting>,
    pub meeting_summary: Option<MeetingSummary>,
    pub game_over: Option<GameOver>,
    pub comms: CommsSabotage,
    pub vitals: Vec<VitalsEntry>,
    pub death_note: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: GameStatus::Lobby,
            player_name: String::new(),
            lobby_code: None,
            role: Role::Crewmate,
            role_label: role_label(Role::Crewmate),
            role_hint: role_hint(Role::Crewmate),
            is_impostor: false,
            is_alive: true,
            is_leader: false,
            is_medic: false,
            capabilities: Capabilities::empty(),
            tasks: Vec::new(),
            progress: Progress::default(),
            kill_remaining: 0,
            kill_targets: Vec::new(),
            reportable_bodies: Vec::new(),
            dead_players: Vec::new(),
            meeting: None,
            meeting_summary: None,
            game_over: None,
            comms: CommsSabotage::default(),
            vitals: Vec::new(),
            death_note: None,
        }
    }
}

impl ViewState {
    pub fn can(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn can_report(&self) -> bool {
        self.can(Capabilities::REPORT)
    }

    pub fn can_call_emergency(&self) -> bool {
        self.can(Capabilities::EMERGENCY)
    }

    pub fn meeting_id(&self) -> Option<&str> {
        self.meeting.as_ref().map(|meeting| meeting.id.as_str())
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskItem> {
        self.tasks
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|task| task.id == task_id)
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Crewmate => "Crewmate",
        Role::Impostor => "Impostor",
    }
}

pub fn role_hint(role: Role) -> &'static str {
    match role {
        Role::Crewmate => "Finish your tasks and watch for impostors.",
        Role::Impostor => "Blend in and strike when the cooldown allows.",
    }
}

/// Edge-triggered effects. Each fires once per occurrence of its condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    ImpostorReveal,
    ProgressFlash { from: f64, to: f64 },
    ClearVoteFeedback,
    CancelVoteDelay,
}

/// "Last observed" state carried across polls. Cleared on return to lobby.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markers {
    pub(crate) last_meeting_id: Option<String>,
    pub(crate) last_summary_id: Option<String>,
    pub(crate) impostor_reveal_shown: bool,
    pub(crate) last_revealed_ratio: Option<f64>,
}

impl Markers {
    pub fn last_meeting_id(&self) -> Option<&str> {
        self.last_meeting_id.as_deref()
    }

    pub fn last_summary_id(&self) -> Option<&str> {
        self.last_summary_id.as_deref()
    }

    pub fn impostor_reveal_shown(&self) -> bool {
        self.impostor_reveal_shown
    }

    pub fn last_revealed_ratio(&self) -> Option<f64> {
        self.last_revealed_ratio
    }

    pub fn is_clear(&self) -> bool {
        *self == Markers::default()
    }
}
