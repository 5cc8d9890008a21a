#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Once;

use crew_core::{
    ClientConfig, Command, DispatchError, Intent, PendingAction, PollPayload, PollTrigger, Route,
    Session, TickReport,
};
use crew_proto::{
    decode_envelope, decode_lobby, decode_snapshot, ActionReply, AuthorityError, PollTarget,
};
use serde_json::{json, Value};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_client_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test client config at {}",
            config_path.display()
        );

        std::env::set_var(crew_core::config::CLIENT_CONFIG_ENV, &config_path);
    });
}

/// In-memory stand-in for the game authority. Replies go through the same
/// envelope decoding as real HTTP bodies.
#[derive(Debug, Default)]
pub struct FakeAuthority {
    pub player: Value,
    pub lobby: Value,
    pub session_gone: bool,
    pub transport_down: bool,
    scripted: HashMap<&'static str, VecDeque<(u16, Value)>>,
    pub sent: Vec<PendingAction>,
    pub polls: Vec<PollTarget>,
}

impl FakeAuthority {
    pub fn with_player(player: Value) -> Self {
        Self {
            player,
            lobby: json!({ "code": "ABCD", "status": "lobby" }),
            ..Self::default()
        }
    }

    pub fn with_lobby(lobby: Value) -> Self {
        Self {
            player: json!({ "status": "lobby" }),
            lobby,
            ..Self::default()
        }
    }

    /// Queue the reply for the next request to `path`.
    pub fn script(&mut self, path: &'static str, status: u16, body: Value) {
        self.scripted.entry(path).or_default().push_back((status, body));
    }

    pub fn poll(&mut self, target: PollTarget) -> Result<PollPayload, AuthorityError> {
        self.polls.push(target);
        if self.transport_down {
            return Err(AuthorityError::Transport("connection refused".into()));
        }
        if self.session_gone {
            return Err(decode_envelope(404, r#"{"ok":false,"error":"Session not found"}"#)
                .expect_err("404 is an error"));
        }
        let body = match target {
            PollTarget::Player => &self.player,
            PollTarget::Lobby => &self.lobby,
        };
        let value = decode_envelope(200, &body.to_string())?;
        match target {
            PollTarget::Player => decode_snapshot(value).map(|s| PollPayload::Player(Box::new(s))),
            PollTarget::Lobby => decode_lobby(value).map(|l| PollPayload::Lobby(Box::new(l))),
        }
    }

    pub fn send(&mut self, action: &PendingAction) -> Result<ActionReply, AuthorityError> {
        self.sent.push(action.clone());
        if self.transport_down {
            return Err(AuthorityError::Transport("connection refused".into()));
        }
        let (status, body) = self
            .scripted
            .get_mut(action.request.path())
            .and_then(VecDeque::pop_front)
            .unwrap_or((200, json!({ "ok": true })));
        let value = decode_envelope(status, &body.to_string())?;
        action.request.parse_reply(value)
    }
}

/// Runs a session against a [`FakeAuthority`], executing commands inline.
pub struct Driver {
    pub session: Session,
    pub authority: FakeAuthority,
}

impl Driver {
    pub fn new(route: Route, authority: FakeAuthority) -> Self {
        Self {
            session: Session::new(route, &ClientConfig::default()),
            authority,
        }
    }

    pub fn game(player: Value) -> Self {
        Self::new(Route::Game, FakeAuthority::with_player(player))
    }

    pub fn run(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            let follow_up = match command {
                Command::Poll(ticket) => {
                    let result = self.authority.poll(ticket.target());
                    self.session.complete_poll(ticket, result)
                }
                Command::Send(action) => {
                    let result = self.authority.send(&action);
                    self.session.resolve(action.id, result)
                }
            };
            queue.extend(follow_up);
        }
    }

    pub fn poll(&mut self) {
        let commands = self.session.request_poll(PollTrigger::Interval);
        self.run(commands);
    }

    pub fn submit(&mut self, intent: Intent) -> Result<(), DispatchError> {
        let commands = self.session.submit(intent)?;
        self.run(commands);
        Ok(())
    }

    pub fn ticks(&mut self, count: usize) -> Vec<TickReport> {
        (0..count).map(|_| self.session.tick()).collect()
    }
}
