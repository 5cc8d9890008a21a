mod common;

use common::{Driver, FakeAuthority};
use crew_core::{ConfigBoundsError, DispatchError, Intent, NoticeScope, Route};
use crew_proto::{ActionRequest, PollTarget};
use serde_json::{json, Value};

fn lobby(status: &str) -> Value {
    json!({
        "code": "ABCD",
        "status": status,
        "round": 1,
        "playerCount": 2,
        "requiredPlayers": 4,
        "everyoneReady": false,
        "canStart": false,
        "players": [
            { "id": "p1", "name": "Ana", "ready": false, "isMe": true, "leader": true },
            { "id": "p2", "name": "Rui", "ready": true }
        ]
    })
}

fn lobby_driver() -> Driver {
    let mut driver = Driver::new(Route::Lobby, FakeAuthority::with_lobby(lobby("lobby")));
    driver.poll();
    driver
}

fn lobby_notice(driver: &Driver) -> Option<String> {
    driver
        .session
        .notices()
        .latest(NoticeScope::Lobby)
        .map(|notice| notice.text.clone())
}

#[test]
fn lobby_poll_derives_leader_and_waiting_message() {
    let driver = lobby_driver();
    let frame = driver.session.frame();
    assert_eq!(frame.lobby.status_message, "Waiting for 2 more player(s) (minimum 4).");
    assert!(frame.lobby.is_leader);
    assert_eq!(frame.lobby.ready_count, 1);
    assert!(frame.controls.ready);
    assert!(frame.controls.config);
    assert!(!frame.controls.start);
    assert_eq!(driver.authority.polls, vec![PollTarget::Lobby]);
}

#[test]
fn ready_toggle_sends_the_flipped_flag_and_repolls() {
    let mut driver = lobby_driver();
    driver.submit(Intent::ToggleReady).expect("ready accepted");
    assert_eq!(
        driver.authority.sent.last().map(|action| action.request.clone()),
        Some(ActionRequest::SetReady { ready: true })
    );
    assert_eq!(driver.authority.polls.len(), 2);
    assert!(driver.session.frame().controls.ready);
}

#[test]
fn out_of_bounds_config_is_refused_before_sending() {
    let mut driver = lobby_driver();
    let err = driver
        .submit(Intent::UpdateConfig {
            required_players: Some(40),
            kill_cooldown: None,
        })
        .expect_err("bounds enforced");
    assert_eq!(
        err,
        DispatchError::Bounds(ConfigBoundsError::RequiredPlayers {
            value: 40,
            min: 2,
            max: 15
        })
    );
    assert!(driver.authority.sent.is_empty());
    assert_eq!(
        lobby_notice(&driver).as_deref(),
        Some("required players must be between 2 and 15 (got 40)")
    );

    driver
        .submit(Intent::UpdateConfig {
            required_players: Some(5),
            kill_cooldown: Some(30),
        })
        .expect("in-bounds edit accepted");
    assert_eq!(lobby_notice(&driver).as_deref(), Some("Settings saved."));
}

#[test]
fn kick_reports_removed_name_and_refuses_self() {
    let mut driver = lobby_driver();
    assert_eq!(
        driver.submit(Intent::KickPlayer {
            player_id: "p1".into()
        }),
        Err(DispatchError::SelfKick)
    );
    assert_eq!(
        driver.submit(Intent::KickPlayer {
            player_id: "p9".into()
        }),
        Err(DispatchError::NotListed("p9".into()))
    );
    assert!(driver.authority.sent.is_empty());

    driver.authority.script(
        "/api/lobby/kick",
        200,
        json!({ "ok": true, "removed": { "id": "p2", "name": "Rui" } }),
    );
    driver
        .submit(Intent::KickPlayer {
            player_id: "p2".into(),
        })
        .expect("kick accepted");
    assert_eq!(lobby_notice(&driver).as_deref(), Some("Removed Rui."));
}

#[test]
fn lobby_rejection_lands_in_lobby_scope() {
    let mut driver = lobby_driver();
    driver.authority.script(
        "/api/ready",
        409,
        json!({ "ok": false, "error": "The game already started." }),
    );
    driver.submit(Intent::ToggleReady).expect("request sent");
    assert_eq!(lobby_notice(&driver).as_deref(), Some("The game already started."));
    assert!(driver.session.frame().controls.ready);
}

#[test]
fn game_start_moves_to_player_polling() {
    let mut driver = lobby_driver();
    driver.authority.lobby = lobby("in_game");
    driver.authority.player = json!({
        "status": "in_game",
        "role": "crewmate",
        "tasks": { "fast": [{ "id": "fast:1", "name": "Swipe card", "done": false }] }
    });
    driver.poll();

    assert_eq!(driver.session.route(), Route::Game);
    assert_eq!(
        driver.authority.polls,
        vec![PollTarget::Lobby, PollTarget::Lobby, PollTarget::Player]
    );
    assert!(driver.session.frame().controls.tasks);
}
