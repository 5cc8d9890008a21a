use std::fmt::Write;

use crew_core::{headless_session, Frame, Intent};
use crew_proto::{DeadPlayer, GameStatus, Progress, Snapshot, TaskItem, TaskLists};

fn seconds(value: Option<u32>) -> String {
    value
        .map(|s| format!("{s}s"))
        .unwrap_or_else(|| "-".to_string())
}

fn render(frame: &Frame) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "route: {}", frame.route.as_str());
    let _ = writeln!(out, "role: {} - {}", frame.view.role_label, frame.view.role_hint);
    let _ = writeln!(out, "overlay: {}", frame.server_overlay.as_str());
    let _ = writeln!(out, "tasks:");
    for group in &frame.view.tasks {
        let _ = writeln!(out, "  {}", group.label);
        if let Some(placeholder) = group.placeholder() {
            let _ = writeln!(out, "    {placeholder}");
        }
        for task in &group.items {
            let mark = if task.done { "x" } else { " " };
            let pending = if frame.controls.busy_tasks.contains(&task.id) {
                " (pending)"
            } else {
                ""
            };
            let _ = writeln!(out, "    [{mark}] {}{pending}", task.name);
        }
    }
    let targets: Vec<_> = frame.view.kill_targets.iter().map(|p| p.name.as_str()).collect();
    let bodies: Vec<_> = frame
        .view
        .reportable_bodies
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    let _ = writeln!(
        out,
        "kill targets: {}",
        if targets.is_empty() { "-".to_string() } else { targets.join(", ") }
    );
    let _ = writeln!(
        out,
        "reportable: {}",
        if bodies.is_empty() { "-".to_string() } else { bodies.join(", ") }
    );
    let _ = writeln!(
        out,
        "timers: kill={} meeting={} vote={} sabotage={}",
        seconds(frame.timers.kill_cooldown),
        seconds(frame.timers.meeting),
        seconds(frame.timers.vote_delay),
        seconds(frame.timers.sabotage)
    );

    let controls = &frame.controls;
    let enabled: Vec<&str> = [
        ("tasks", controls.tasks),
        ("kill", controls.kill),
        ("sabotage", controls.sabotage),
        ("report", controls.report),
        ("emergency", controls.emergency),
        ("vote", controls.vote),
        ("reset", controls.reset),
        ("ready", controls.ready),
        ("start", controls.start),
        ("config", controls.config),
    ]
    .into_iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| name)
    .collect();
    let _ = write!(out, "enabled: {}", enabled.join(" "));
    out
}

fn crewmate_leader() -> Snapshot {
    Snapshot {
        status: GameStatus::InGame,
        name: "Ana".into(),
        is_leader: true,
        emergency_available: true,
        tasks: TaskLists {
            common: vec![TaskItem {
                id: "common:1".into(),
                name: "Fix wiring".into(),
                done: false,
            }],
            long: Vec::new(),
            fast: vec![TaskItem {
                id: "fast:1".into(),
                name: "Swipe card".into(),
                done: true,
            }],
        },
        progress: Progress {
            total: 10,
            completed: 4,
            current: 0.4,
            revealed_ratio: 0.4,
        },
        dead_players: vec![DeadPlayer {
            id: "p2".into(),
            name: "Rui".into(),
            ..DeadPlayer::default()
        }],
        ..Snapshot::default()
    }
}

#[test]
fn crewmate_with_pending_toggle() {
    let mut session = headless_session();
    session.apply_snapshot(&crewmate_leader());
    session
        .submit(Intent::ToggleTask {
            task_id: "common:1".into(),
        })
        .expect("toggle dispatched");

    let rendered = render(&session.frame());
    insta::assert_snapshot!("crewmate_pending_toggle", rendered);
}
