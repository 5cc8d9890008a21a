//! Poll admission control.
//!
//! The gate is a two-state saga (idle / in flight) with a single pending
//! slot. Triggers that arrive while a poll is outstanding collapse into that
//! slot and are re-issued exactly once when the outstanding poll resolves.

use crew_proto::PollTarget;
use tracing::{debug, trace};

/// Why a poll was requested. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTrigger {
    Startup,
    Interval,
    Manual,
    ActionCompleted,
    RouteChanged,
}

/// Handle for one issued poll. Sequence numbers increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    seq: u64,
    target: PollTarget,
}

impl PollTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn target(&self) -> PollTarget {
        self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollRequest {
    /// Caller must perform this poll and report back via [`PollGate::complete`].
    Issue(PollTicket),
    /// A poll is already outstanding; a single retry is queued.
    Coalesced,
    /// Polling stopped permanently (session gone).
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCompletion {
    /// Whether the response is the newest issued and may be applied.
    pub apply: bool,
    /// Follow-up poll owed to triggers coalesced while this one was in flight.
    pub reissue: Option<PollTicket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    InFlight(PollTicket),
}

#[derive(Debug, Clone)]
pub struct PollGate {
    state: GateState,
    pending: Option<PollTarget>,
    next_seq: u64,
    halted: bool,
}

impl Default for PollGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PollGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
            pending: None,
            next_seq: 1,
            halted: false,
        }
    }

    pub fn in_flight(&self) -> Option<PollTicket> {
        match self.state {
            GateState::InFlight(ticket) => Some(ticket),
            GateState::Idle => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Sequence number the next issued poll will carry.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn request(&mut self, target: PollTarget, trigger: PollTrigger) -> PollRequest {
        if self.halted {
            return PollRequest::Halted;
        }
        match self.state {
            GateState::Idle => {
                let ticket = self.issue(target);
                debug!(target: "crewlink::poll", seq = ticket.seq, ?trigger, "poll.issued");
                PollRequest::Issue(ticket)
            }
            GateState::InFlight(current) => {
                self.pending = Some(target);
                trace!(
                    target: "crewlink::poll",
                    in_flight = current.seq,
                    ?trigger,
                    "poll.coalesced"
                );
                PollRequest::Coalesced
            }
        }
    }

    /// Resolve `ticket`. Stale or unknown tickets are never applied.
    pub fn complete(&mut self, ticket: PollTicket) -> PollCompletion {
        if self.state != GateState::InFlight(ticket) {
            debug!(target: "crewlink::poll", seq = ticket.seq, "poll.stale_dropped");
            return PollCompletion {
                apply: false,
                reissue: None,
            };
        }
        // one poll in flight at a time, so the in-flight ticket is always
        // the newest issued
        self.state = GateState::Idle;

        let reissue = match self.pending.take() {
            Some(target) if !self.halted => {
                let next = self.issue(target);
                debug!(target: "crewlink::poll", seq = next.seq, "poll.reissued");
                Some(next)
            }
            _ => None,
        };
        PollCompletion {
            apply: true,
            reissue,
        }
    }

    /// Stop polling for good; any queued retry is discarded.
    pub fn halt(&mut self) {
        self.halted = true;
        self.pending = None;
    }

    fn issue(&mut self, target: PollTarget) -> PollTicket {
        let ticket = PollTicket {
            seq: self.next_seq,
            target,
        };
        self.next_seq += 1;
        self.state = GateState::InFlight(ticket);
        ticket
    }
}
