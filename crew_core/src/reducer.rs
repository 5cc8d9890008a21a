//! Snapshot -> [`ViewState`] reduction.
//!
//! `reduce` is pure: it reads the previous markers and hands back new ones
//! instead of touching shared state, so applying the same snapshot twice
//! yields the same view and no repeated one-shot effects.

use crew_proto::{GameStatus, Role, Snapshot, SpecialRole, TaskCategory};

use crate::capabilities::Capabilities;
use crate::view_state::{role_hint, role_label, Effect, Markers, TaskGroup, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub view: ViewState,
    pub markers: Markers,
    pub effects: Vec<Effect>,
    /// The authority reports the lobby: every phase-local state must reset.
    pub return_to_lobby: bool,
}

pub fn reduce(snapshot: &Snapshot, previous: &Markers) -> Reduction {
    let view = project(snapshot);

    if snapshot.status == GameStatus::Lobby {
        return Reduction {
            view,
            markers: Markers::default(),
            effects: Vec::new(),
            return_to_lobby: true,
        };
    }

    let mut markers = previous.clone();
    let mut effects = Vec::new();

    if view.is_impostor && !markers.impostor_reveal_shown {
        markers.impostor_reveal_shown = true;
        effects.push(Effect::ImpostorReveal);
    }

    let ratio = view.progress.revealed();
    if let Some(last) = markers.last_revealed_ratio {
        if ratio > last {
            effects.push(Effect::ProgressFlash {
                from: last,
                to: ratio,
            });
        }
    }
    markers.last_revealed_ratio = Some(ratio);

    Reduction {
        view,
        markers,
        effects,
        return_to_lobby: false,
    }
}

fn project(snapshot: &Snapshot) -> ViewState {
    let role = snapshot.role();
    let is_impostor = role == Role::Impostor;
    let is_medic = snapshot.special_role == Some(SpecialRole::Medic);

    let tasks = TaskCategory::ALL
        .iter()
        .map(|category| TaskGroup {
            category: *category,
            label: category.label(),
            items: snapshot.tasks.category(*category).to_vec(),
        })
        .collect();

    // Never trust the payload to gate targets by role.
    let kill_targets = if is_impostor {
        snapshot.kill_targets.clone()
    } else {
        Vec::new()
    };

    let reportable_bodies = snapshot
        .dead_players
        .iter()
        .filter(|body| !body.reported)
        .cloned()
        .collect();

    let vitals = if is_medic {
        snapshot.vitals.clone().unwrap_or_default()
    } else {
        Vec::new()
    };

    let death_note = if snapshot.alive {
        None
    } else {
        snapshot
            .death_note
            .clone()
            .filter(|note| !note.trim().is_empty())
    };

    ViewState {
        status: snapshot.status,
        player_name: snapshot.name.clone(),
        lobby_code: snapshot.lobby_code.clone(),
        role,
        role_label: role_label(role),
        role_hint: role_hint(role),
        is_impostor,
        is_alive: snapshot.alive,
        is_leader: snapshot.is_leader,
        is_medic,
        capabilities: Capabilities::derive(snapshot),
        tasks,
        progress: snapshot.progress,
        kill_remaining: if is_impostor {
            snapshot.kill_remaining
        } else {
            0
        },
        kill_targets,
        reportable_bodies,
        dead_players: snapshot.dead_players.clone(),
        meeting: snapshot.meeting.clone(),
        meeting_summary: snapshot.meeting_summary.clone(),
        game_over: snapshot.game_over.clone(),
        comms: snapshot.comms_sabotage,
        vitals,
        death_note,
    }
}
