mod common;

use std::time::Duration;

use anyhow::Result;
use crew_core::{load_client_config, Session, Route};
use crew_proto::PollTarget;

#[test]
fn config_path_from_environment_is_honoured() -> Result<()> {
    common::ensure_test_config();
    let (config, metadata) = load_client_config(None);

    assert_eq!(config.poll_interval(PollTarget::Player), Duration::from_millis(4000));
    assert_eq!(config.poll_interval(PollTarget::Lobby), Duration::from_millis(2000));
    assert_eq!(config.notice_history(), 4);
    let path = metadata
        .path()
        .ok_or_else(|| anyhow::anyhow!("metadata should record the file"))?;
    assert!(path.ends_with("test_client_config.json"));

    let mut session = Session::new(Route::Game, &config);
    for attempt in 0..6 {
        let commands = session.request_poll(crew_core::PollTrigger::Interval);
        let crew_core::Command::Poll(ticket) = commands[0].clone() else {
            anyhow::bail!("expected a poll command");
        };
        session.complete_poll(
            ticket,
            Err(crew_proto::AuthorityError::Transport(format!("attempt {attempt}"))),
        );
    }
    assert_eq!(session.notices().len(), 1);
    Ok(())
}
