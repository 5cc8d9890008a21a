use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crew_core::{load_client_config, Effect, Route, Session, TimerReadout};
use crew_proto::decode_snapshot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay recorded player-state payloads through the crewlink engine", long_about = None)]
struct Args {
    /// JSON array of player-state payloads, applied in order
    #[arg(long)]
    snapshots: PathBuf,

    /// Local one-second ticks to run after each payload
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Client config JSON (defaults to the builtin)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    route: &'static str,
    overlay: &'static str,
    picker_open: bool,
    blackout: bool,
    timers: TimerReadout,
    effects: Vec<Effect>,
    expired: Vec<&'static str>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let data = fs::read_to_string(&args.snapshots)
        .with_context(|| format!("Failed to read snapshots at {}", args.snapshots.display()))?;
    let payloads: Vec<JsonValue> = serde_json::from_str(&data).with_context(|| {
        format!(
            "Expected a JSON array of payloads in {}",
            args.snapshots.display()
        )
    })?;

    let (config, _) = load_client_config(args.config.as_deref());
    let mut session = Session::new(Route::Game, &config);

    for (step, payload) in payloads.into_iter().enumerate() {
        let snapshot = decode_snapshot(payload)
            .with_context(|| format!("Payload {} is not a player-state snapshot", step))?;
        session.apply_snapshot(&snapshot);
        let effects = session.take_effects();

        let mut expired = Vec::new();
        for _ in 0..args.ticks {
            let report = session.tick();
            expired.extend(report.expired.iter().map(|kind| kind.as_str()));
        }

        let frame = session.frame();
        let report = StepReport {
            step,
            route: frame.route.as_str(),
            overlay: frame.server_overlay.as_str(),
            picker_open: frame.picker.is_open(),
            blackout: frame.blackout,
            timers: frame.timers,
            effects,
            expired,
        };
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
