//! Async driver: performs the session's commands over HTTP and keeps the
//! poll cadence and the one-second countdown tick going.

use std::time::Duration;

use color_eyre::Result;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crew_core::{
    ActionId, ClientConfig, Command, Frame, Intent, PollPayload, PollTicket, PollTrigger, Route,
    Session,
};
use crew_proto::{ActionReply, AuthorityError};

use crate::http::HttpAuthority;

enum Completion {
    Poll(PollTicket, Result<PollPayload, AuthorityError>),
    Action(ActionId, Result<ActionReply, AuthorityError>),
}

pub async fn run(
    mut session: Session,
    authority: HttpAuthority,
    config: ClientConfig,
    mut intents: UnboundedReceiver<Intent>,
    frames: UnboundedSender<Frame>,
) -> Result<()> {
    let (done_tx, mut done_rx) = unbounded_channel::<Completion>();
    let mut route = session.route();
    let mut poll_timer = cadence(poll_period(&config, route));
    let mut tick_timer = cadence(config.timer_tick());

    perform(&authority, &done_tx, session.request_poll(PollTrigger::Startup));
    if frames.send(session.frame()).is_err() {
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = poll_timer.tick() => {
                perform(&authority, &done_tx, session.request_poll(PollTrigger::Interval));
            }
            _ = tick_timer.tick() => {
                if session.tick().is_empty() {
                    continue;
                }
            }
            Some(done) = done_rx.recv() => {
                let commands = match done {
                    Completion::Poll(ticket, result) => session.complete_poll(ticket, result),
                    Completion::Action(id, result) => session.resolve(id, result),
                };
                perform(&authority, &done_tx, commands);
            }
            intent = intents.recv() => {
                let Some(intent) = intent else {
                    info!(target: "crewlink::runtime", "runtime.shutdown");
                    break;
                };
                debug!(target: "crewlink::runtime", ?intent, "intent.received");
                if let Ok(commands) = session.submit(intent) {
                    perform(&authority, &done_tx, commands);
                }
            }
        }

        if session.route() != route {
            route = session.route();
            poll_timer = cadence(poll_period(&config, route));
            info!(target: "crewlink::runtime", route = route.as_str(), "route.changed");
        }
        for effect in session.take_effects() {
            let rendered = serde_json::to_string(&effect).unwrap_or_default();
            info!(target: "crewlink::runtime", effect = %rendered, "effect.fired");
        }
        if frames.send(session.frame()).is_err() {
            break;
        }
    }
    Ok(())
}

fn poll_period(config: &ClientConfig, route: Route) -> Duration {
    route
        .poll_target()
        .map(|target| config.poll_interval(target))
        .unwrap_or(Duration::from_secs(3600))
}

/// Interval whose first tick lands one period from now.
fn cadence(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn perform(authority: &HttpAuthority, done: &UnboundedSender<Completion>, commands: Vec<Command>) {
    for command in commands {
        let authority = authority.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let completion = match command {
                Command::Poll(ticket) => {
                    Completion::Poll(ticket, authority.poll(ticket.target()).await)
                }
                Command::Send(action) => {
                    Completion::Action(action.id, authority.send(&action.request).await)
                }
            };
            let _ = done.send(completion);
        });
    }
}
