//! Bookkeeping for user actions sent to the authority.
//!
//! A control is disabled from the moment its request is issued until
//! [`Dispatcher::finish`] runs for it, whatever the outcome.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crew_proto::{ActionRequest, VoteTarget};

use crate::lobby::ConfigBoundsError;
use crate::overlay::PickerError;

pub type ActionId = u64;

/// UI control that triggered a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Task(String),
    Vote,
    Kill,
    Report,
    Sabotage,
    Emergency,
    Reset,
    Ready,
    Start,
    Config,
    Kick(String),
}

impl ControlId {
    pub fn for_request(request: &ActionRequest) -> Self {
        match request {
            ActionRequest::ToggleTask { task_id, .. } => ControlId::Task(task_id.clone()),
            ActionRequest::CastVote { .. } => ControlId::Vote,
            ActionRequest::Kill { .. } => ControlId::Kill,
            ActionRequest::Report { .. } => ControlId::Report,
            ActionRequest::SabotageComms => ControlId::Sabotage,
            ActionRequest::CallEmergency => ControlId::Emergency,
            ActionRequest::ResetGame => ControlId::Reset,
            ActionRequest::SetReady { .. } => ControlId::Ready,
            ActionRequest::StartGame => ControlId::Start,
            ActionRequest::UpdateConfig { .. } => ControlId::Config,
            ActionRequest::KickPlayer { player_id } => ControlId::Kick(player_id.clone()),
        }
    }
}

/// A request the driver must send, then report back with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub id: ActionId,
    pub request: ActionRequest,
}

impl PendingAction {
    pub fn control(&self) -> ControlId {
        ControlId::for_request(&self.request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0} is already in progress")]
    Busy(&'static str),
    #[error("{0} is not available right now")]
    Unavailable(&'static str),
    #[error("only the lobby leader can do that")]
    NotLeader,
    #[error("{0} is no longer listed")]
    NotListed(String),
    #[error("nothing is waiting for confirmation")]
    NothingStaged,
    #[error("you cannot remove yourself")]
    SelfKick,
    #[error("unknown task {0}")]
    UnknownTask(String),
    #[error("the session has ended")]
    SessionEnded,
    #[error(transparent)]
    Bounds(#[from] ConfigBoundsError),
    #[error(transparent)]
    Picker(#[from] PickerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskOverride {
    done: bool,
    /// First poll sequence number issued after the authority accepted the
    /// toggle. Earlier polls may predate the write.
    settled_from: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    next_id: ActionId,
    in_flight: HashMap<ActionId, PendingAction>,
    busy: HashSet<ControlId>,
    task_overrides: HashMap<String, TaskOverride>,
    staged_vote: Option<VoteTarget>,
    reset_staged: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the request's control and hand back the action to send.
    pub fn begin(&mut self, request: ActionRequest) -> Result<PendingAction, DispatchError> {
        let control = ControlId::for_request(&request);
        if self.busy.contains(&control) {
            return Err(DispatchError::Busy(request.kind().as_str()));
        }
        self.next_id += 1;
        let action = PendingAction {
            id: self.next_id,
            request,
        };
        self.busy.insert(control);
        self.in_flight.insert(action.id, action.clone());
        info!(
            target: "crewlink::actions",
            id = action.id,
            kind = action.request.kind().as_str(),
            path = action.request.path(),
            "action.dispatched"
        );
        Ok(action)
    }

    /// Re-enable the control of a resolved action. Unknown ids yield `None`.
    pub fn finish(&mut self, id: ActionId) -> Option<PendingAction> {
        let action = self.in_flight.remove(&id)?;
        self.busy.remove(&action.control());
        debug!(target: "crewlink::actions", id, "action.finished");
        Some(action)
    }

    pub fn is_busy(&self, control: &ControlId) -> bool {
        self.busy.contains(control)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn optimistic_toggle(&mut self, task_id: &str, done: bool) {
        self.task_overrides.insert(
            task_id.to_string(),
            TaskOverride {
                done,
                settled_from: None,
            },
        );
    }

    /// Keep the optimistic mark until a poll issued at or after `first_fresh_seq`
    /// replaces it.
    pub fn settle_task(&mut self, task_id: &str, first_fresh_seq: u64) {
        if let Some(entry) = self.task_overrides.get_mut(task_id) {
            entry.settled_from = Some(first_fresh_seq);
        }
    }

    pub fn revert_task(&mut self, task_id: &str) {
        self.task_overrides.remove(task_id);
    }

    /// A snapshot from poll `seq` is authoritative for every toggle settled
    /// at or before it.
    pub fn on_snapshot(&mut self, seq: u64) {
        self.task_overrides
            .retain(|_, entry| entry.settled_from.map_or(true, |from| seq < from));
    }

    pub fn effective_done(&self, task_id: &str, server_done: bool) -> bool {
        self.task_overrides
            .get(task_id)
            .map(|entry| entry.done)
            .unwrap_or(server_done)
    }

    pub fn stage_vote(&mut self, target: VoteTarget) {
        self.staged_vote = Some(target);
    }

    pub fn staged_vote(&self) -> Option<&VoteTarget> {
        self.staged_vote.as_ref()
    }

    pub fn take_staged_vote(&mut self) -> Result<VoteTarget, DispatchError> {
        self.staged_vote.take().ok_or(DispatchError::NothingStaged)
    }

    pub fn stage_reset(&mut self) {
        self.reset_staged = true;
    }

    pub fn reset_staged(&self) -> bool {
        self.reset_staged
    }

    pub fn take_staged_reset(&mut self) -> Result<(), DispatchError> {
        if std::mem::take(&mut self.reset_staged) {
            Ok(())
        } else {
            Err(DispatchError::NothingStaged)
        }
    }

    pub fn cancel_vote(&mut self) {
        self.staged_vote = None;
    }

    pub fn cancel_reset(&mut self) {
        self.reset_staged = false;
    }

    /// Drop phase-local state on return to lobby. In-flight requests keep
    /// their controls disabled until they resolve.
    pub fn reset_phase(&mut self) {
        self.task_overrides.clear();
        self.staged_vote = None;
        self.reset_staged = false;
    }
}
