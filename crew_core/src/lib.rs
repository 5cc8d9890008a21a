//! Client engine for the crewlink social-deduction game.
//!
//! Turns polled authority snapshots into a role-gated view, selects the
//! active overlays, keeps local countdowns ticking between polls and tracks
//! in-flight player actions. Everything is synchronous; a driver performs
//! the I/O requested through [`Command`] values and feeds results back into
//! the [`Session`].

mod capabilities;
pub mod config;
mod dispatcher;
mod fetcher;
mod frame;
mod lobby;
mod notices;
mod overlay;
pub mod reducer;
mod session;
mod timers;
mod view_state;

pub use capabilities::Capabilities;
pub use config::{load_client_config, ClientConfig, ClientConfigError, ClientConfigMetadata};
pub use dispatcher::{ActionId, ControlId, DispatchError, Dispatcher, PendingAction};
pub use fetcher::{PollCompletion, PollGate, PollRequest, PollTicket, PollTrigger};
pub use frame::{Controls, Frame, TimerReadout};
pub use lobby::{reduce_lobby, validate_config, ConfigBoundsError, LobbyView};
pub use notices::{Notice, NoticeLevel, NoticeLog, NoticeScope, CONNECTION_PROBLEM};
pub use overlay::{OverlayController, OverlayUpdate, Picker, PickerError, PickerKind, ServerOverlay};
pub use reducer::{reduce, Reduction};
pub use session::{Command, Intent, PollPayload, Route, Session, SESSION_EXPIRED};
pub use timers::{Countdown, TickOutcome, TickReport, TimerBank, TimerKind};
pub use view_state::{Effect, Markers, TaskGroup, ViewState, EMPTY_TASKS_PLACEHOLDER};

/// Build a game-route session from the builtin configuration.
pub fn headless_session() -> Session {
    Session::new(Route::Game, &ClientConfig::builtin())
}
