//! Render model handed to presentation adapters.

use serde::Serialize;

use crate::lobby::LobbyView;
use crate::notices::Notice;
use crate::overlay::{Picker, ServerOverlay};
use crate::session::Route;
use crate::view_state::ViewState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub tasks: bool,
    pub busy_tasks: Vec<String>,
    pub kill: bool,
    pub sabotage: bool,
    pub report: bool,
    pub emergency: bool,
    pub vote: bool,
    pub reset: bool,
    pub ready: bool,
    pub start: bool,
    pub config: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerReadout {
    pub kill_cooldown: Option<u32>,
    pub meeting: Option<u32>,
    pub vote_delay: Option<u32>,
    pub sabotage: Option<u32>,
}

/// Everything a renderer needs for one screen, with optimistic task marks
/// already applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub route: Route,
    pub view: ViewState,
    pub lobby: LobbyView,
    pub server_overlay: ServerOverlay,
    pub picker: Picker,
    pub blackout: bool,
    pub controls: Controls,
    pub timers: TimerReadout,
    pub vote_feedback: Option<String>,
    pub staged_vote: Option<String>,
    pub reset_staged: bool,
    pub notices: Vec<Notice>,
}

impl Frame {
    /// Text shown beside the voting options.
    pub fn vote_status(&self) -> Option<String> {
        match self.timers.vote_delay {
            Some(seconds) => Some(format!("Voting opens in {seconds}s")),
            None => self.vote_feedback.clone(),
        }
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.first()
    }
}
