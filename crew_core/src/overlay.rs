//! Overlay selection.
//!
//! Three layers are tracked independently: the server-driven overlay
//! (game over, meeting summary, meeting), the user-opened picker, and the
//! comms blackout banner.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crew_proto::{DeadPlayer, PlayerCard};

use crate::view_state::{Effect, Markers, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerOverlay {
    #[default]
    None,
    Meeting,
    MeetingSummary,
    GameOver,
}

impl ServerOverlay {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerOverlay::None => "none",
            ServerOverlay::Meeting => "meeting",
            ServerOverlay::MeetingSummary => "meeting_summary",
            ServerOverlay::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Picker {
    #[default]
    Closed,
    Kill {
        candidates: Vec<PlayerCard>,
    },
    Report {
        candidates: Vec<DeadPlayer>,
        inline_error: Option<String>,
    },
}

impl Picker {
    pub fn is_open(&self) -> bool {
        !matches!(self, Picker::Closed)
    }

    pub fn kind(&self) -> Option<PickerKind> {
        match self {
            Picker::Closed => None,
            Picker::Kill { .. } => Some(PickerKind::Kill),
            Picker::Report { .. } => Some(PickerKind::Report),
        }
    }

    /// Whether `id` was listed when the picker was opened or last refreshed.
    pub fn offers(&self, id: &str) -> bool {
        match self {
            Picker::Closed => false,
            Picker::Kill { candidates } => candidates.iter().any(|c| c.id == id),
            Picker::Report { candidates, .. } => candidates.iter().any(|c| c.id == id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    Kill,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("no players are in range")]
    NoKillTargets,
    #[error("there are no bodies to report")]
    NoBodies,
    #[error("close the {0} overlay first")]
    Blocked(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayUpdate {
    pub previous: ServerOverlay,
    pub current: ServerOverlay,
    pub effects: Vec<Effect>,
    pub picker_closed: bool,
}

impl OverlayUpdate {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayController {
    server: ServerOverlay,
    summary_dismissed: bool,
    picker: Picker,
    blackout: bool,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self) -> ServerOverlay {
        self.server
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    pub fn blackout(&self) -> bool {
        self.blackout
    }

    /// Re-evaluate the server-driven overlay, in precedence order.
    pub fn apply(&mut self, view: &ViewState, markers: &mut Markers) -> OverlayUpdate {
        let previous = self.server;
        let mut effects = Vec::new();

        let next = if view.game_over.is_some() {
            ServerOverlay::GameOver
        } else if let Some(summary) = view.meeting_summary.as_ref() {
            if markers.last_summary_id.as_deref() != Some(summary.id.as_str()) {
                markers.last_summary_id = Some(summary.id.clone());
                self.summary_dismissed = false;
                ServerOverlay::MeetingSummary
            } else if previous == ServerOverlay::MeetingSummary
                && !self.summary_dismissed
                && view.meeting.is_none()
            {
                ServerOverlay::MeetingSummary
            } else {
                meeting_or_none(view, markers, &mut effects)
            }
        } else {
            meeting_or_none(view, markers, &mut effects)
        };

        self.server = next;
        let picker_closed = next != ServerOverlay::None && self.close_picker();
        if previous != next {
            info!(
                target: "crewlink::overlay",
                from = previous.as_str(),
                to = next.as_str(),
                "overlay.changed"
            );
        }
        OverlayUpdate {
            previous,
            current: next,
            effects,
            picker_closed,
        }
    }

    /// Hide the current meeting summary until a summary with a new id arrives.
    pub fn dismiss_summary(&mut self) -> bool {
        if self.server != ServerOverlay::MeetingSummary {
            return false;
        }
        self.summary_dismissed = true;
        self.server = ServerOverlay::None;
        true
    }

    pub fn open_kill_picker(&mut self, candidates: &[PlayerCard]) -> Result<(), PickerError> {
        self.ensure_unblocked()?;
        if candidates.is_empty() {
            return Err(PickerError::NoKillTargets);
        }
        self.picker = Picker::Kill {
            candidates: candidates.to_vec(),
        };
        Ok(())
    }

    pub fn open_report_picker(&mut self, candidates: &[DeadPlayer]) -> Result<(), PickerError> {
        self.ensure_unblocked()?;
        if candidates.is_empty() {
            return Err(PickerError::NoBodies);
        }
        self.picker = Picker::Report {
            candidates: candidates.to_vec(),
            inline_error: None,
        };
        Ok(())
    }

    pub fn set_report_error(&mut self, message: impl Into<String>) {
        if let Picker::Report { inline_error, .. } = &mut self.picker {
            *inline_error = Some(message.into());
        }
    }

    /// Replace the open picker's options from the latest view. Closes the
    /// picker when nothing remains to choose from; returns whether it is
    /// still open.
    pub fn refresh_picker(&mut self, view: &ViewState) -> bool {
        match &mut self.picker {
            Picker::Closed => false,
            Picker::Kill { candidates } => {
                *candidates = view.kill_targets.clone();
                if candidates.is_empty() {
                    self.picker = Picker::Closed;
                    return false;
                }
                true
            }
            Picker::Report { candidates, .. } => {
                *candidates = view.reportable_bodies.clone();
                if candidates.is_empty() {
                    self.picker = Picker::Closed;
                    return false;
                }
                true
            }
        }
    }

    pub fn close_picker(&mut self) -> bool {
        let was_open = self.picker.is_open();
        self.picker = Picker::Closed;
        was_open
    }

    /// Returns whether the blackout state changed.
    pub fn set_blackout(&mut self, active: bool) -> bool {
        if self.blackout == active {
            return false;
        }
        self.blackout = active;
        info!(target: "crewlink::overlay", active, "overlay.blackout");
        true
    }

    /// Close everything at once (return to lobby).
    pub fn reset(&mut self) {
        *self = OverlayController::default();
    }

    fn ensure_unblocked(&self) -> Result<(), PickerError> {
        match self.server {
            ServerOverlay::None => Ok(()),
            other => Err(PickerError::Blocked(other.as_str())),
        }
    }
}

fn meeting_or_none(view: &ViewState, markers: &mut Markers, effects: &mut Vec<Effect>) -> ServerOverlay {
    let Some(meeting) = view.meeting.as_ref() else {
        return ServerOverlay::None;
    };
    if markers.last_meeting_id.as_deref() != Some(meeting.id.as_str()) {
        markers.last_meeting_id = Some(meeting.id.clone());
        effects.push(Effect::ClearVoteFeedback);
        effects.push(Effect::CancelVoteDelay);
    }
    ServerOverlay::Meeting
}
