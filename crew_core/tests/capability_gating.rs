use crew_core::{headless_session, Capabilities, DispatchError, Intent, PickerError};
use crew_proto::{GameStatus, PlayerCard, Role, Snapshot};

fn with_targets(role: Role) -> Snapshot {
    Snapshot {
        status: GameStatus::InGame,
        role: Some(role),
        kill_targets: vec![
            PlayerCard {
                id: "p2".into(),
                name: "Rui".into(),
                avatar: String::new(),
            },
            PlayerCard {
                id: "p3".into(),
                name: "Bia".into(),
                avatar: String::new(),
            },
        ],
        ..Snapshot::default()
    }
}

#[test]
fn crewmate_payload_with_targets_renders_empty() {
    let mut session = headless_session();
    session.apply_snapshot(&with_targets(Role::Crewmate));

    let frame = session.frame();
    assert!(frame.view.kill_targets.is_empty());
    assert!(!frame.controls.kill);
    assert!(!frame.controls.sabotage);
    assert!(!frame
        .view
        .capabilities
        .intersects(Capabilities::KILL | Capabilities::SABOTAGE));
}

#[test]
fn crewmate_cannot_open_kill_picker() {
    let mut session = headless_session();
    session.apply_snapshot(&with_targets(Role::Crewmate));
    assert_eq!(
        session.submit(Intent::OpenKillPicker),
        Err(DispatchError::Unavailable("kill"))
    );
    assert_eq!(
        session.submit(Intent::Kill {
            target_id: "p2".into()
        }),
        Err(DispatchError::NotListed("p2".into()))
    );
}

#[test]
fn impostor_sees_targets_and_kill_enabled() {
    let mut session = headless_session();
    session.apply_snapshot(&with_targets(Role::Impostor));

    let frame = session.frame();
    assert_eq!(frame.view.kill_targets.len(), 2);
    assert!(frame.controls.kill);
    assert!(frame.controls.sabotage);
    assert!(session.submit(Intent::OpenKillPicker).is_ok());
}

#[test]
fn impostor_without_targets_gets_picker_error() {
    let mut session = headless_session();
    let mut snapshot = with_targets(Role::Impostor);
    snapshot.kill_targets.clear();
    session.apply_snapshot(&snapshot);

    assert!(!session.frame().controls.kill);
    assert_eq!(
        session.submit(Intent::OpenKillPicker),
        Err(DispatchError::Picker(PickerError::NoKillTargets))
    );
}
