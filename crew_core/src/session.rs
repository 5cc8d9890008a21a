//! The owned client aggregate.
//!
//! `Session` holds the view, markers, overlays, timers, poll gate and action
//! bookkeeping for one player. It performs no I/O: every call returns the
//! [`Command`]s the driver must carry out, and results come back through
//! [`Session::complete_poll`] and [`Session::resolve`].

use serde::Serialize;
use tracing::{debug, info, warn};

use crew_proto::{
    ActionReply, ActionRequest, AuthorityError, LobbySnapshot, PollTarget, Snapshot, VoteTarget,
};

use crate::capabilities::Capabilities;
use crate::config::ClientConfig;
use crate::dispatcher::{ActionId, ControlId, DispatchError, Dispatcher, PendingAction};
use crate::fetcher::{PollGate, PollRequest, PollTicket, PollTrigger};
use crate::frame::{Controls, Frame, TimerReadout};
use crate::lobby::{reduce_lobby, validate_config, LobbyView};
use crate::notices::{NoticeLog, NoticeScope, CONNECTION_PROBLEM};
use crate::overlay::{OverlayController, PickerKind, ServerOverlay};
use crate::reducer::reduce;
use crate::timers::{TickReport, TimerBank, TimerKind};
use crate::view_state::{Effect, Markers, ViewState};

pub const SESSION_EXPIRED: &str = "Session expired. Rejoin from the entry screen.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// The session is gone; nothing is polled any more.
    Entry,
    Lobby,
    Game,
}

impl Route {
    pub fn poll_target(&self) -> Option<PollTarget> {
        match self {
            Route::Entry => None,
            Route::Lobby => Some(PollTarget::Lobby),
            Route::Game => Some(PollTarget::Player),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Entry => "entry",
            Route::Lobby => "lobby",
            Route::Game => "game",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollPayload {
    Player(Box<Snapshot>),
    Lobby(Box<LobbySnapshot>),
}

/// Work the driver must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Poll(PollTicket),
    Send(PendingAction),
}

/// User intent, as produced by a key map or a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    ToggleTask { task_id: String },
    StageVote(VoteTarget),
    ConfirmVote,
    CancelVote,
    OpenKillPicker,
    Kill { target_id: String },
    OpenReportPicker,
    Report { body_id: String },
    ClosePicker,
    SabotageComms,
    CallEmergency,
    DismissSummary,
    StageReset,
    ConfirmReset,
    CancelReset,
    ToggleReady,
    StartGame,
    UpdateConfig {
        required_players: Option<u32>,
        kill_cooldown: Option<u32>,
    },
    KickPlayer { player_id: String },
}

impl Intent {
    fn scope(&self) -> NoticeScope {
        match self {
            Intent::Kill { .. } => NoticeScope::KillPicker,
            Intent::Report { .. } => NoticeScope::ReportPicker,
            Intent::StageVote(_) | Intent::ConfirmVote => NoticeScope::Meeting,
            Intent::ToggleReady
            | Intent::StartGame
            | Intent::UpdateConfig { .. }
            | Intent::KickPlayer { .. } => NoticeScope::Lobby,
            _ => NoticeScope::Global,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    route: Route,
    view: ViewState,
    lobby: LobbyView,
    markers: Markers,
    overlay: OverlayController,
    timers: TimerBank,
    gate: PollGate,
    dispatcher: Dispatcher,
    notices: NoticeLog,
    vote_feedback: Option<String>,
    fired: Vec<Effect>,
    snapshots_applied: u64,
}

impl Session {
    pub fn new(route: Route, config: &ClientConfig) -> Self {
        Self {
            route,
            view: ViewState::default(),
            lobby: LobbyView::default(),
            markers: Markers::default(),
            overlay: OverlayController::new(),
            timers: TimerBank::new(),
            gate: PollGate::new(),
            dispatcher: Dispatcher::new(),
            notices: NoticeLog::with_capacity(config.notice_history()),
            vote_feedback: None,
            fired: Vec::new(),
            snapshots_applied: 0,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn lobby(&self) -> &LobbyView {
        &self.lobby
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    pub fn gate(&self) -> &PollGate {
        &self.gate
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    /// One-shot effects fired since the last call, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.fired)
    }

    pub fn request_poll(&mut self, trigger: PollTrigger) -> Vec<Command> {
        let Some(target) = self.route.poll_target() else {
            return Vec::new();
        };
        match self.gate.request(target, trigger) {
            PollRequest::Issue(ticket) => vec![Command::Poll(ticket)],
            PollRequest::Coalesced | PollRequest::Halted => Vec::new(),
        }
    }

    pub fn complete_poll(
        &mut self,
        ticket: PollTicket,
        result: Result<PollPayload, AuthorityError>,
    ) -> Vec<Command> {
        let completion = self.gate.complete(ticket);
        let mut commands: Vec<Command> = completion.reissue.map(Command::Poll).into_iter().collect();
        if !completion.apply {
            return commands;
        }

        match result {
            Ok(payload) => {
                let before = self.route;
                match (payload, before) {
                    (PollPayload::Player(snapshot), Route::Game) => {
                        self.apply_player(&snapshot, ticket.seq());
                    }
                    (PollPayload::Lobby(lobby), Route::Lobby) => {
                        self.apply_lobby(&lobby);
                    }
                    _ => {
                        debug!(
                            target: "crewlink::poll",
                            seq = ticket.seq(),
                            route = before.as_str(),
                            "poll.route_mismatch"
                        );
                    }
                }
                if self.route.poll_target() != Some(ticket.target()) {
                    commands.extend(self.request_poll(PollTrigger::RouteChanged));
                }
            }
            Err(AuthorityError::SessionGone) => {
                self.enter_entry();
                commands.clear();
            }
            Err(err) => {
                warn!(target: "crewlink::poll", seq = ticket.seq(), error = %err, "poll.failed");
                self.notices.error(NoticeScope::Global, failure_text(&err));
            }
        }
        commands
    }

    /// Apply one player-state snapshot: reduce, select overlays, resync timers.
    ///
    /// A snapshot applied directly counts as newer than every issued poll.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Vec<Effect> {
        self.apply_player(snapshot, u64::MAX)
    }

    fn apply_player(&mut self, snapshot: &Snapshot, seq: u64) -> Vec<Effect> {
        let reduction = reduce(snapshot, &self.markers);
        self.snapshots_applied += 1;

        if reduction.return_to_lobby {
            self.reset_phase();
            self.view = reduction.view;
            self.markers = reduction.markers;
            if self.route == Route::Game {
                self.route = Route::Lobby;
            }
            info!(target: "crewlink::sync", status = snapshot.status.as_str(), "snapshot.applied=lobby");
            return Vec::new();
        }

        self.view = reduction.view;
        self.markers = reduction.markers;
        let mut effects = reduction.effects;
        effects.extend(self.evaluate_overlay());

        self.timers.resync(&self.view);
        self.overlay
            .set_blackout(self.timers.is_running(TimerKind::Sabotage));
        self.dispatcher.on_snapshot(seq);

        let picker_stale = match self.overlay.picker().kind() {
            Some(PickerKind::Kill) => !self.view.can(Capabilities::KILL),
            Some(PickerKind::Report) => !self.view.can_report(),
            None => false,
        };
        if picker_stale {
            self.overlay.close_picker();
        }

        info!(
            target: "crewlink::sync",
            status = snapshot.status.as_str(),
            overlay = self.overlay.server().as_str(),
            effects = effects.len(),
            "snapshot.applied"
        );
        self.fired.extend(effects.iter().cloned());
        effects
    }

    pub fn apply_lobby(&mut self, snapshot: &LobbySnapshot) {
        self.lobby = reduce_lobby(snapshot);
        if self.lobby.game_started && self.route == Route::Lobby {
            info!(target: "crewlink::sync", code = %self.lobby.code, "route.game");
            self.route = Route::Game;
        }
    }

    /// Advance every local countdown by one second.
    pub fn tick(&mut self) -> TickReport {
        let report = self.timers.tick_all();
        if report.expired.contains(&TimerKind::Sabotage) {
            self.overlay.set_blackout(false);
        }
        report
    }

    /// Validate and start an intent. Rejections are also recorded as notices.
    pub fn submit(&mut self, intent: Intent) -> Result<Vec<Command>, DispatchError> {
        let scope = intent.scope();
        let result = self.try_submit(intent);
        if let Err(err) = &result {
            debug!(target: "crewlink::actions", error = %err, "intent.rejected");
            self.notices.error(scope, err.to_string());
        }
        result
    }

    fn try_submit(&mut self, intent: Intent) -> Result<Vec<Command>, DispatchError> {
        if self.route == Route::Entry {
            return Err(DispatchError::SessionEnded);
        }
        match intent {
            Intent::Refresh => Ok(self.request_poll(PollTrigger::Manual)),
            Intent::ToggleTask { task_id } => {
                self.require(self.route == Route::Game && self.view.can(Capabilities::TASKS), "tasks")?;
                let server_done = self
                    .view
                    .task(&task_id)
                    .map(|task| task.done)
                    .ok_or_else(|| DispatchError::UnknownTask(task_id.clone()))?;
                let done = !self.dispatcher.effective_done(&task_id, server_done);
                let action = self.dispatcher.begin(ActionRequest::ToggleTask {
                    task_id: task_id.clone(),
                    done,
                })?;
                self.dispatcher.optimistic_toggle(&task_id, done);
                Ok(vec![Command::Send(action)])
            }
            Intent::StageVote(target) => {
                self.require(self.voting_open(), "voting")?;
                if let VoteTarget::Player(id) = &target {
                    let listed = self
                        .view
                        .meeting
                        .as_ref()
                        .map(|meeting| meeting.alive_players.iter().any(|p| &p.id == id))
                        .unwrap_or(false);
                    if !listed {
                        return Err(DispatchError::NotListed(id.clone()));
                    }
                }
                self.dispatcher.stage_vote(target);
                Ok(Vec::new())
            }
            Intent::ConfirmVote => {
                let target = self.dispatcher.take_staged_vote()?;
                self.require(self.voting_open(), "voting")?;
                self.send(ActionRequest::CastVote { target })
            }
            Intent::CancelVote => {
                self.dispatcher.cancel_vote();
                Ok(Vec::new())
            }
            Intent::OpenKillPicker => {
                self.require(self.kill_ready(), "kill")?;
                self.overlay.open_kill_picker(&self.view.kill_targets)?;
                self.notices.clear_scope(NoticeScope::KillPicker);
                Ok(Vec::new())
            }
            Intent::Kill { target_id } => {
                self.require_listed(PickerKind::Kill, &target_id)?;
                self.send(ActionRequest::Kill { target_id })
            }
            Intent::OpenReportPicker => {
                self.require(self.report_ready(), "report")?;
                self.overlay.open_report_picker(&self.view.reportable_bodies)?;
                self.notices.clear_scope(NoticeScope::ReportPicker);
                Ok(Vec::new())
            }
            Intent::Report { body_id } => {
                self.require_listed(PickerKind::Report, &body_id)?;
                self.send(ActionRequest::Report { body_id })
            }
            Intent::ClosePicker => {
                self.overlay.close_picker();
                Ok(Vec::new())
            }
            Intent::SabotageComms => {
                self.require(
                    self.view.can(Capabilities::SABOTAGE) && !self.overlay.blackout(),
                    "sabotage",
                )?;
                self.send(ActionRequest::SabotageComms)
            }
            Intent::CallEmergency => {
                self.require(
                    self.view.can_call_emergency() && !self.overlay.blackout(),
                    "emergency meeting",
                )?;
                self.send(ActionRequest::CallEmergency)
            }
            Intent::DismissSummary => {
                if self.overlay.dismiss_summary() {
                    let effects = self.evaluate_overlay();
                    self.fired.extend(effects);
                }
                Ok(Vec::new())
            }
            Intent::StageReset => {
                if !self.is_leader() {
                    return Err(DispatchError::NotLeader);
                }
                self.dispatcher.stage_reset();
                Ok(Vec::new())
            }
            Intent::ConfirmReset => {
                self.dispatcher.take_staged_reset()?;
                if !self.is_leader() {
                    return Err(DispatchError::NotLeader);
                }
                self.send(ActionRequest::ResetGame)
            }
            Intent::CancelReset => {
                self.dispatcher.cancel_reset();
                Ok(Vec::new())
            }
            Intent::ToggleReady => {
                self.require(self.route == Route::Lobby, "ready")?;
                let ready = !self.lobby.me_ready;
                self.send(ActionRequest::SetReady { ready })
            }
            Intent::StartGame => {
                self.require(self.route == Route::Lobby && self.lobby.can_start, "start")?;
                self.send(ActionRequest::StartGame)
            }
            Intent::UpdateConfig {
                required_players,
                kill_cooldown,
            } => {
                self.require(self.route == Route::Lobby, "settings")?;
                if !self.lobby.is_leader {
                    return Err(DispatchError::NotLeader);
                }
                validate_config(&self.lobby.limits, required_players, kill_cooldown)?;
                self.send(ActionRequest::UpdateConfig {
                    required_players,
                    kill_cooldown,
                })
            }
            Intent::KickPlayer { player_id } => {
                self.require(self.route == Route::Lobby, "kick")?;
                if !self.lobby.is_leader {
                    return Err(DispatchError::NotLeader);
                }
                if self.lobby.me_id.as_deref() == Some(player_id.as_str()) {
                    return Err(DispatchError::SelfKick);
                }
                if !self.lobby.players.iter().any(|p| p.id == player_id) {
                    return Err(DispatchError::NotListed(player_id));
                }
                self.send(ActionRequest::KickPlayer { player_id })
            }
        }
    }

    /// Settle an action sent earlier. The triggering control is re-enabled
    /// whatever the outcome; success schedules a fresh poll.
    pub fn resolve(
        &mut self,
        id: ActionId,
        result: Result<ActionReply, AuthorityError>,
    ) -> Vec<Command> {
        let Some(action) = self.dispatcher.finish(id) else {
            debug!(target: "crewlink::actions", id, "action.unknown");
            return Vec::new();
        };
        match result {
            Ok(reply) => {
                self.on_success(&action.request, reply);
                self.request_poll(PollTrigger::ActionCompleted)
            }
            Err(AuthorityError::SessionGone) => {
                self.enter_entry();
                Vec::new()
            }
            Err(err) => {
                warn!(
                    target: "crewlink::actions",
                    id,
                    kind = action.request.kind().as_str(),
                    error = %err,
                    "action.failed"
                );
                self.on_failure(&action.request, &err);
                Vec::new()
            }
        }
    }

    pub fn frame(&self) -> Frame {
        let mut view = self.view.clone();
        for group in &mut view.tasks {
            for task in &mut group.items {
                task.done = self.dispatcher.effective_done(&task.id, task.done);
            }
        }

        let busy_tasks = view
            .tasks
            .iter()
            .flat_map(|group| group.items.iter())
            .filter(|task| self.dispatcher.is_busy(&ControlId::Task(task.id.clone())))
            .map(|task| task.id.clone())
            .collect();
        let controls = Controls {
            tasks: self.route == Route::Game && view.can(Capabilities::TASKS),
            busy_tasks,
            kill: self.kill_ready() && !view.kill_targets.is_empty(),
            sabotage: view.can(Capabilities::SABOTAGE)
                && !self.overlay.blackout()
                && !self.dispatcher.is_busy(&ControlId::Sabotage),
            report: self.report_ready() && !view.reportable_bodies.is_empty(),
            emergency: view.can_call_emergency()
                && !self.overlay.blackout()
                && !self.dispatcher.is_busy(&ControlId::Emergency),
            vote: self.voting_open() && !self.dispatcher.is_busy(&ControlId::Vote),
            reset: self.is_leader() && !self.dispatcher.is_busy(&ControlId::Reset),
            ready: self.route == Route::Lobby && !self.dispatcher.is_busy(&ControlId::Ready),
            start: self.route == Route::Lobby
                && self.lobby.can_start
                && !self.dispatcher.is_busy(&ControlId::Start),
            config: self.route == Route::Lobby
                && self.lobby.is_leader
                && !self.dispatcher.is_busy(&ControlId::Config),
        };

        Frame {
            route: self.route,
            view,
            lobby: self.lobby.clone(),
            server_overlay: self.overlay.server(),
            picker: self.overlay.picker().clone(),
            blackout: self.overlay.blackout(),
            controls,
            timers: TimerReadout {
                kill_cooldown: self.timers.remaining(TimerKind::KillCooldown),
                meeting: self.timers.remaining(TimerKind::Meeting),
                vote_delay: self.timers.remaining(TimerKind::VoteDelay),
                sabotage: self.timers.remaining(TimerKind::Sabotage),
            },
            vote_feedback: self.vote_feedback.clone(),
            staged_vote: self
                .dispatcher
                .staged_vote()
                .map(|target| target.as_wire().to_string()),
            reset_staged: self.dispatcher.reset_staged(),
            notices: self.notices.iter().cloned().collect(),
        }
    }

    fn on_success(&mut self, request: &ActionRequest, reply: ActionReply) {
        match (request, reply) {
            // the follow-up poll is requested after this, so it carries at
            // least the gate's next sequence number
            (ActionRequest::ToggleTask { task_id, .. }, _) => {
                self.dispatcher.settle_task(task_id, self.gate.next_seq())
            }
            (ActionRequest::CastVote { .. }, ActionReply::Vote(vote)) => {
                let text = if vote.is_final {
                    "Vote recorded. Waiting for the results."
                } else {
                    "Vote recorded."
                };
                self.vote_feedback = Some(text.to_string());
            }
            (ActionRequest::Kill { .. }, ActionReply::Kill(kill)) => {
                self.timers
                    .start(TimerKind::KillCooldown, kill.cooldown.unwrap_or(0));
                self.overlay.close_picker();
            }
            (ActionRequest::Report { .. }, _) => {
                self.overlay.close_picker();
            }
            (ActionRequest::SabotageComms, _) => {
                self.notices.info(NoticeScope::Global, "Comms sabotaged.");
            }
            (ActionRequest::ResetGame, reply) => {
                debug!(target: "crewlink::actions", ?reply, "reset.redirect");
                self.reset_phase();
                self.route = Route::Lobby;
            }
            (ActionRequest::StartGame, reply) => {
                debug!(target: "crewlink::actions", ?reply, "start.redirect");
                self.route = Route::Game;
            }
            (ActionRequest::UpdateConfig { .. }, _) => {
                self.notices.info(NoticeScope::Lobby, "Settings saved.");
            }
            (ActionRequest::KickPlayer { player_id }, reply) => {
                let name = match reply {
                    ActionReply::Kick(kick) => kick
                        .removed
                        .map(|removed| removed.name)
                        .filter(|name| !name.is_empty()),
                    _ => None,
                }
                .unwrap_or_else(|| player_id.clone());
                self.notices.info(NoticeScope::Lobby, format!("Removed {name}."));
            }
            _ => {}
        }
    }

    fn on_failure(&mut self, request: &ActionRequest, err: &AuthorityError) {
        let message = failure_text(err);
        let rejection = err.rejection();
        match request {
            ActionRequest::ToggleTask { task_id, .. } => {
                self.dispatcher.revert_task(task_id);
                self.notices.error(NoticeScope::Global, message);
            }
            ActionRequest::CastVote { .. } => match rejection.and_then(|r| r.delay) {
                Some(delay) => {
                    self.timers.start(TimerKind::VoteDelay, delay);
                    self.vote_feedback = None;
                }
                None => {
                    self.vote_feedback = Some(message.clone());
                    self.notices.error(NoticeScope::Meeting, message);
                }
            },
            ActionRequest::Kill { .. } => {
                if let Some(remaining) = rejection.and_then(|r| r.remaining) {
                    self.timers.start(TimerKind::KillCooldown, remaining);
                }
                let scope = if self.overlay.picker().kind() == Some(PickerKind::Kill)
                    && self.overlay.refresh_picker(&self.view)
                {
                    NoticeScope::KillPicker
                } else {
                    NoticeScope::Global
                };
                self.notices.error(scope, message);
            }
            ActionRequest::Report { .. } => {
                if self.overlay.picker().kind() == Some(PickerKind::Report)
                    && self.overlay.refresh_picker(&self.view)
                {
                    self.overlay.set_report_error(message.clone());
                    self.notices.error(NoticeScope::ReportPicker, message);
                } else {
                    self.notices.error(NoticeScope::Global, message);
                }
            }
            ActionRequest::SetReady { .. }
            | ActionRequest::StartGame
            | ActionRequest::UpdateConfig { .. }
            | ActionRequest::KickPlayer { .. } => {
                self.notices.error(NoticeScope::Lobby, message);
            }
            ActionRequest::SabotageComms
            | ActionRequest::CallEmergency
            | ActionRequest::ResetGame => {
                self.notices.error(NoticeScope::Global, message);
            }
        }
    }

    fn evaluate_overlay(&mut self) -> Vec<Effect> {
        let update = self.overlay.apply(&self.view, &mut self.markers);
        for effect in &update.effects {
            match effect {
                Effect::ClearVoteFeedback => {
                    self.vote_feedback = None;
                    self.notices.clear_scope(NoticeScope::Meeting);
                }
                // every snapshot resyncs the vote lock from its own meeting, so
                // the running delay already belongs to the new meeting here
                Effect::CancelVoteDelay
                | Effect::ImpostorReveal
                | Effect::ProgressFlash { .. } => {}
            }
        }
        if update.current != ServerOverlay::Meeting {
            self.dispatcher.cancel_vote();
        }
        update.effects
    }

    fn send(&mut self, request: ActionRequest) -> Result<Vec<Command>, DispatchError> {
        let action = self.dispatcher.begin(request)?;
        Ok(vec![Command::Send(action)])
    }

    fn require(&self, allowed: bool, what: &'static str) -> Result<(), DispatchError> {
        if allowed {
            Ok(())
        } else {
            Err(DispatchError::Unavailable(what))
        }
    }

    fn require_listed(&self, kind: PickerKind, id: &str) -> Result<(), DispatchError> {
        let picker = self.overlay.picker();
        if picker.kind() == Some(kind) && picker.offers(id) {
            Ok(())
        } else {
            Err(DispatchError::NotListed(id.to_string()))
        }
    }

    fn kill_ready(&self) -> bool {
        self.view.can(Capabilities::KILL)
            && !self.timers.is_running(TimerKind::KillCooldown)
            && !self.dispatcher.is_busy(&ControlId::Kill)
    }

    fn report_ready(&self) -> bool {
        self.view.can_report()
            && !self.overlay.blackout()
            && !self.dispatcher.is_busy(&ControlId::Report)
    }

    fn voting_open(&self) -> bool {
        self.overlay.server() == ServerOverlay::Meeting
            && self.view.can(Capabilities::VOTE)
            && !self.timers.is_running(TimerKind::VoteDelay)
    }

    fn is_leader(&self) -> bool {
        match self.route {
            Route::Game => self.view.is_leader,
            Route::Lobby => self.lobby.is_leader,
            Route::Entry => false,
        }
    }

    /// Atomic return to lobby: timers stop, overlays close, markers clear.
    fn reset_phase(&mut self) {
        self.timers.stop_all();
        self.overlay.reset();
        self.dispatcher.reset_phase();
        self.markers = Markers::default();
        self.vote_feedback = None;
    }

    fn enter_entry(&mut self) {
        warn!(target: "crewlink::sync", route = self.route.as_str(), "session.gone");
        self.gate.halt();
        self.reset_phase();
        self.route = Route::Entry;
        self.notices.error(NoticeScope::Global, SESSION_EXPIRED);
    }
}

fn failure_text(err: &AuthorityError) -> String {
    match err {
        AuthorityError::Transport(_) => CONNECTION_PROBLEM.to_string(),
        AuthorityError::Malformed(_) => "Unexpected reply from the server.".to_string(),
        AuthorityError::Rejected(rejection) => rejection.message.clone(),
        AuthorityError::SessionGone => SESSION_EXPIRED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_proto::{CommsSabotage, GameStatus, Meeting, MeetingVoter, PlayerCard, Rejection, Role};

    fn session() -> Session {
        Session::new(Route::Game, &ClientConfig::default())
    }

    fn impostor() -> Snapshot {
        Snapshot {
            status: GameStatus::InGame,
            role: Some(Role::Impostor),
            kill_targets: vec![PlayerCard {
                id: "p2".into(),
                name: "Rui".into(),
                avatar: String::new(),
            }],
            ..Snapshot::default()
        }
    }

    fn sent(commands: Vec<Command>) -> PendingAction {
        match commands.into_iter().next() {
            Some(Command::Send(action)) => action,
            other => panic!("expected a send, got {other:?}"),
        }
    }

    #[test]
    fn lobby_snapshot_resets_phase_atomically() {
        let mut session = session();
        let mut snapshot = impostor();
        snapshot.comms_sabotage = CommsSabotage {
            active: true,
            remaining: 30,
        };
        session.apply_snapshot(&snapshot);
        session.submit(Intent::OpenKillPicker).unwrap();
        assert!(session.overlay().blackout());
        assert!(session.markers().impostor_reveal_shown());

        session.apply_snapshot(&Snapshot::default());
        assert_eq!(session.route(), Route::Lobby);
        assert!(!session.timers().is_running(TimerKind::Sabotage));
        assert!(!session.overlay().blackout());
        assert!(!session.overlay().picker().is_open());
        assert!(session.markers().is_clear());
    }

    #[test]
    fn kill_rejection_with_remaining_restarts_cooldown() {
        let mut session = session();
        session.apply_snapshot(&impostor());
        session.submit(Intent::OpenKillPicker).unwrap();
        let action = sent(
            session
                .submit(Intent::Kill {
                    target_id: "p2".into(),
                })
                .unwrap(),
        );

        let mut rejection = Rejection::new(400, "Too soon");
        rejection.remaining = Some(7);
        session.resolve(action.id, Err(AuthorityError::Rejected(rejection)));

        assert_eq!(session.timers().remaining(TimerKind::KillCooldown), Some(7));
        assert_eq!(
            session.notices().latest(NoticeScope::KillPicker).map(|n| n.text.as_str()),
            Some("Too soon")
        );
        assert!(!session.frame().controls.kill);
    }

    #[test]
    fn vote_requires_confirmation_and_delay_locks_voting() {
        let mut session = session();
        let mut snapshot = impostor();
        snapshot.meeting = Some(Meeting {
            id: "m1".into(),
            ends_in: 60,
            alive_players: vec![MeetingVoter {
                id: "p2".into(),
                ..MeetingVoter::default()
            }],
            ..Meeting::default()
        });
        session.apply_snapshot(&snapshot);

        assert!(session.submit(Intent::ConfirmVote).is_err());
        assert!(session
            .submit(Intent::StageVote(VoteTarget::Player("p9".into())))
            .is_err());
        session.submit(Intent::StageVote(VoteTarget::Skip)).unwrap();
        let action = sent(session.submit(Intent::ConfirmVote).unwrap());
        assert_eq!(action.request.body(), Some(serde_json::json!({ "target": "skip" })));

        let mut rejection = Rejection::new(400, "Voting has not started");
        rejection.delay = Some(3);
        session.resolve(action.id, Err(AuthorityError::Rejected(rejection)));

        let frame = session.frame();
        assert!(!frame.controls.vote);
        assert_eq!(frame.vote_status().as_deref(), Some("Voting opens in 3s"));
        for _ in 0..3 {
            session.tick();
        }
        assert!(session.frame().controls.vote);
    }

    #[test]
    fn transport_failure_keeps_polling() {
        let mut session = session();
        let ticket = match session.request_poll(PollTrigger::Startup).pop() {
            Some(Command::Poll(ticket)) => ticket,
            other => panic!("expected poll, got {other:?}"),
        };
        session.complete_poll(ticket, Err(AuthorityError::Transport("timeout".into())));
        assert_eq!(
            session.notices().latest(NoticeScope::Global).map(|n| n.text.as_str()),
            Some(CONNECTION_PROBLEM)
        );
        assert_eq!(session.request_poll(PollTrigger::Interval).len(), 1);
    }

    #[test]
    fn session_gone_stops_everything() {
        let mut session = session();
        let ticket = match session.request_poll(PollTrigger::Startup).pop() {
            Some(Command::Poll(ticket)) => ticket,
            other => panic!("expected poll, got {other:?}"),
        };
        session.request_poll(PollTrigger::Manual);
        let commands = session.complete_poll(ticket, Err(AuthorityError::SessionGone));
        assert!(commands.is_empty());
        assert_eq!(session.route(), Route::Entry);
        assert!(session.request_poll(PollTrigger::Interval).is_empty());
        assert_eq!(
            session.submit(Intent::Refresh),
            Err(DispatchError::SessionEnded)
        );
    }
}
