//! Local countdowns shown between polls.
//!
//! Each [`Countdown`] is `Idle -> Running -> Idle`. Values received from the
//! authority always replace the local value; nothing is ever drift-corrected.

use tracing::debug;

use crate::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    KillCooldown,
    Meeting,
    VoteDelay,
    Sabotage,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::KillCooldown,
        TimerKind::Meeting,
        TimerKind::VoteDelay,
        TimerKind::Sabotage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::KillCooldown => "kill_cooldown",
            TimerKind::Meeting => "meeting",
            TimerKind::VoteDelay => "vote_delay",
            TimerKind::Sabotage => "sabotage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CountdownState {
    #[default]
    Idle,
    Running {
        remaining: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Ticked(u32),
    Expired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    state: CountdownState,
    /// Bumped on every start so a superseded run is distinguishable.
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running instance. Zero leaves the countdown idle.
    pub fn start(&mut self, seconds: u32) -> bool {
        self.stop();
        if seconds == 0 {
            return false;
        }
        self.generation += 1;
        self.state = CountdownState::Running { remaining: seconds };
        true
    }

    pub fn stop(&mut self) {
        self.state = CountdownState::Idle;
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            CountdownState::Idle => TickOutcome::Idle,
            CountdownState::Running { remaining } if remaining <= 1 => {
                self.state = CountdownState::Idle;
                TickOutcome::Expired
            }
            CountdownState::Running { remaining } => {
                let remaining = remaining - 1;
                self.state = CountdownState::Running { remaining };
                TickOutcome::Ticked(remaining)
            }
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            CountdownState::Idle => None,
            CountdownState::Running { remaining } => Some(remaining),
        }
    }

    pub fn is_running(&self) -> bool {
        self.remaining().is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of one local second elapsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub changed: Vec<TimerKind>,
    pub expired: Vec<TimerKind>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.expired.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerBank {
    kill: Countdown,
    meeting: Countdown,
    vote_delay: Countdown,
    sabotage: Countdown,
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: TimerKind) -> &Countdown {
        match kind {
            TimerKind::KillCooldown => &self.kill,
            TimerKind::Meeting => &self.meeting,
            TimerKind::VoteDelay => &self.vote_delay,
            TimerKind::Sabotage => &self.sabotage,
        }
    }

    pub fn get_mut(&mut self, kind: TimerKind) -> &mut Countdown {
        match kind {
            TimerKind::KillCooldown => &mut self.kill,
            TimerKind::Meeting => &mut self.meeting,
            TimerKind::VoteDelay => &mut self.vote_delay,
            TimerKind::Sabotage => &mut self.sabotage,
        }
    }

    pub fn remaining(&self, kind: TimerKind) -> Option<u32> {
        self.get(kind).remaining()
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        self.get(kind).is_running()
    }

    pub fn start(&mut self, kind: TimerKind, seconds: u32) {
        let countdown = self.get_mut(kind);
        if countdown.start(seconds) {
            debug!(
                target: "crewlink::timers",
                timer = kind.as_str(),
                seconds,
                generation = countdown.generation(),
                "timer.started"
            );
        }
    }

    pub fn stop(&mut self, kind: TimerKind) {
        self.get_mut(kind).stop();
    }

    pub fn stop_all(&mut self) {
        for kind in TimerKind::ALL {
            self.stop(kind);
        }
    }

    pub fn tick_all(&mut self) -> TickReport {
        let mut report = TickReport::default();
        for kind in TimerKind::ALL {
            match self.get_mut(kind).tick() {
                TickOutcome::Idle => {}
                TickOutcome::Ticked(_) => report.changed.push(kind),
                TickOutcome::Expired => {
                    debug!(target: "crewlink::timers", timer = kind.as_str(), "timer.expired");
                    report.changed.push(kind);
                    report.expired.push(kind);
                }
            }
        }
        report
    }

    /// Hard-reset every countdown from a freshly reduced snapshot.
    pub fn resync(&mut self, view: &ViewState) {
        self.stop_all();
        if view.is_impostor {
            self.start(TimerKind::KillCooldown, view.kill_remaining);
        }
        if let Some(meeting) = view.meeting.as_ref() {
            self.start(TimerKind::Meeting, meeting.ends_in);
            self.start(TimerKind::VoteDelay, meeting.voting_starts_in);
        }
        if view.comms.active {
            self.start(TimerKind::Sabotage, view.comms.remaining);
        }
    }
}
