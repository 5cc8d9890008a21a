use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crew_proto::{GameStatus, Role, Snapshot, SpecialRole};

bitflags! {
    /// Actions the current snapshot allows, before local timers are applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u16 {
        const TASKS = 1 << 0;
        const KILL = 1 << 1;
        const SABOTAGE = 1 << 2;
        const REPORT = 1 << 3;
        const EMERGENCY = 1 << 4;
        const VOTE = 1 << 5;
        const VITALS = 1 << 6;
        const RESET = 1 << 7;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl Capabilities {
    pub fn derive(snapshot: &Snapshot) -> Self {
        let mut caps = Capabilities::empty();
        let impostor = snapshot.role() == Role::Impostor;
        let in_play = snapshot.status == GameStatus::InGame
            && snapshot.meeting.is_none()
            && snapshot.game_over.is_none();
        let comms_down = snapshot.comms_sabotage.active && snapshot.comms_sabotage.remaining > 0;

        if !impostor && snapshot.status == GameStatus::InGame && snapshot.game_over.is_none() {
            caps.insert(Capabilities::TASKS);
        }
        if impostor && snapshot.alive && in_play {
            caps.insert(Capabilities::KILL);
            if !comms_down {
                caps.insert(Capabilities::SABOTAGE);
            }
        }
        // the local comms blackout gates report and emergency, so they
        // come back when the countdown expires
        if snapshot.alive && in_play {
            caps.insert(Capabilities::REPORT);
            if snapshot.emergency_available {
                caps.insert(Capabilities::EMERGENCY);
            }
        }
        if snapshot.alive && snapshot.meeting.is_some() && snapshot.game_over.is_none() {
            caps.insert(Capabilities::VOTE);
        }
        if snapshot.special_role == Some(SpecialRole::Medic) {
            caps.insert(Capabilities::VITALS);
        }
        if snapshot.is_leader {
            caps.insert(Capabilities::RESET);
        }
        caps
    }
}
