mod common;

use common::Driver;
use crew_core::{Intent, TimerKind};
use serde_json::json;

fn impostor(kill_remaining: u32) -> serde_json::Value {
    json!({
        "ok": true,
        "status": "in_game",
        "role": "impostor",
        "alive": true,
        "killRemaining": kill_remaining,
        "killTargets": [{ "id": "p2", "name": "Rui", "avatar": "" }]
    })
}

#[test]
fn kill_success_runs_cooldown_to_zero_then_reenables() {
    let mut driver = Driver::game(impostor(0));
    driver.poll();
    assert!(driver.session.frame().controls.kill);

    driver.submit(Intent::OpenKillPicker).expect("picker opens");
    driver
        .authority
        .script("/api/impostor/kill", 200, json!({ "ok": true, "cooldown": 20 }));
    // The authority reports the new cooldown on the follow-up poll as well.
    driver.authority.player = impostor(20);
    driver
        .submit(Intent::Kill {
            target_id: "p2".into(),
        })
        .expect("kill dispatched");

    assert_eq!(driver.authority.sent.len(), 1);
    assert!(!driver.session.overlay().picker().is_open());
    assert_eq!(
        driver.session.timers().remaining(TimerKind::KillCooldown),
        Some(20)
    );

    for tick in 1..20 {
        driver.session.tick();
        let frame = driver.session.frame();
        assert_eq!(frame.timers.kill_cooldown, Some(20 - tick));
        assert!(!frame.controls.kill, "kill disabled at tick {tick}");
    }

    let report = driver.session.tick();
    assert_eq!(report.expired, vec![TimerKind::KillCooldown]);
    let frame = driver.session.frame();
    assert_eq!(frame.timers.kill_cooldown, None);
    assert!(frame.controls.kill);
}

#[test]
fn stale_target_rejection_refreshes_picker() {
    let mut driver = Driver::game(impostor(0));
    driver.poll();
    driver.submit(Intent::OpenKillPicker).expect("picker opens");

    // p2 vanished server-side; the next poll is what the picker refreshes from.
    driver.authority.player = json!({
        "status": "in_game",
        "role": "impostor",
        "killTargets": [{ "id": "p4", "name": "Leo" }]
    });
    driver.poll();
    driver.authority.script(
        "/api/impostor/kill",
        400,
        json!({ "ok": false, "error": "Target is not in range." }),
    );
    driver
        .submit(Intent::Kill {
            target_id: "p2".into(),
        })
        .expect("listed at open time");

    let frame = driver.session.frame();
    assert!(frame.picker.is_open());
    assert!(frame.picker.offers("p4"));
    assert!(!frame.picker.offers("p2"));
    assert!(frame.controls.kill);
}

#[test]
fn kill_rejection_with_no_targets_left_closes_picker() {
    let mut driver = Driver::game(impostor(0));
    driver.poll();
    driver.submit(Intent::OpenKillPicker).expect("picker opens");

    driver.authority.player = json!({ "status": "in_game", "role": "impostor", "killTargets": [] });
    driver.poll();
    assert!(driver.session.overlay().picker().is_open());

    driver.authority.script(
        "/api/impostor/kill",
        400,
        json!({ "ok": false, "error": "Target is not in range." }),
    );
    driver
        .submit(Intent::Kill {
            target_id: "p2".into(),
        })
        .expect("listed at open time");

    assert!(!driver.session.overlay().picker().is_open());
    let notice = driver.session.frame().latest_notice().cloned().expect("notice");
    assert_eq!(notice.text, "Target is not in range.");
}
