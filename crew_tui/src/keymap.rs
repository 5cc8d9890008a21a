//! Key bindings. Pure: the same key on the same frame always maps to the
//! same action.

use crossterm::event::KeyCode;

use crew_core::{Frame, Intent, Picker, Route, ServerOverlay};
use crew_proto::{VoteTarget, SKIP_VOTE};

/// One selectable row in the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Cursor(isize),
    Intent(Intent),
    Ignore,
}

const COOLDOWN_STEP: u32 = 5;

/// Rows the cursor moves over, for whichever panel currently has focus.
pub fn choices(frame: &Frame) -> Vec<Choice> {
    match &frame.picker {
        Picker::Kill { candidates } => {
            return candidates
                .iter()
                .map(|card| Choice {
                    id: card.id.clone(),
                    label: card.name.clone(),
                })
                .collect();
        }
        Picker::Report { candidates, .. } => {
            return candidates
                .iter()
                .map(|body| Choice {
                    id: body.id.clone(),
                    label: body.name.clone(),
                })
                .collect();
        }
        Picker::Closed => {}
    }

    match (frame.route, frame.server_overlay) {
        (Route::Lobby, _) => frame
            .lobby
            .players
            .iter()
            .map(|player| Choice {
                id: player.id.clone(),
                label: player.name.clone(),
            })
            .collect(),
        (Route::Game, ServerOverlay::Meeting) => {
            let mut rows: Vec<Choice> = frame
                .view
                .meeting
                .iter()
                .flat_map(|meeting| meeting.alive_players.iter())
                .map(|voter| Choice {
                    id: voter.id.clone(),
                    label: voter.name.clone(),
                })
                .collect();
            rows.push(Choice {
                id: SKIP_VOTE.to_string(),
                label: "Skip vote".to_string(),
            });
            rows
        }
        (Route::Game, ServerOverlay::None) => frame
            .view
            .tasks
            .iter()
            .flat_map(|group| group.items.iter())
            .map(|task| Choice {
                id: task.id.clone(),
                label: task.name.clone(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn map_key(code: KeyCode, frame: &Frame, selected: Option<&Choice>) -> KeyAction {
    match code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Up | KeyCode::Char('k') => return KeyAction::Cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => return KeyAction::Cursor(1),
        KeyCode::Char('f') => return KeyAction::Intent(Intent::Refresh),
        _ => {}
    }
    match frame.route {
        Route::Entry => match code {
            KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::Ignore,
        },
        Route::Lobby => lobby_key(code, frame, selected),
        Route::Game => game_key(code, frame, selected),
    }
}

fn lobby_key(code: KeyCode, frame: &Frame, selected: Option<&Choice>) -> KeyAction {
    let config = &frame.lobby.config;
    let intent = match code {
        KeyCode::Char(' ') => Intent::ToggleReady,
        KeyCode::Char('g') => Intent::StartGame,
        KeyCode::Char('K') => match selected {
            Some(choice) => Intent::KickPlayer {
                player_id: choice.id.clone(),
            },
            None => return KeyAction::Ignore,
        },
        KeyCode::Char('>') => Intent::UpdateConfig {
            required_players: Some(config.required_players + 1),
            kill_cooldown: None,
        },
        KeyCode::Char('<') => Intent::UpdateConfig {
            required_players: Some(config.required_players.saturating_sub(1)),
            kill_cooldown: None,
        },
        KeyCode::Char('+') | KeyCode::Char('=') => Intent::UpdateConfig {
            required_players: None,
            kill_cooldown: Some(config.kill_cooldown + COOLDOWN_STEP),
        },
        KeyCode::Char('-') => Intent::UpdateConfig {
            required_players: None,
            kill_cooldown: Some(config.kill_cooldown.saturating_sub(COOLDOWN_STEP)),
        },
        _ => return KeyAction::Ignore,
    };
    KeyAction::Intent(intent)
}

fn game_key(code: KeyCode, frame: &Frame, selected: Option<&Choice>) -> KeyAction {
    if frame.reset_staged {
        return match code {
            KeyCode::Char('y') => KeyAction::Intent(Intent::ConfirmReset),
            KeyCode::Char('n') | KeyCode::Esc => KeyAction::Intent(Intent::CancelReset),
            _ => KeyAction::Ignore,
        };
    }

    if let Some(kind) = frame.picker.kind() {
        return match (code, selected) {
            (KeyCode::Esc, _) => KeyAction::Intent(Intent::ClosePicker),
            (KeyCode::Enter, Some(choice)) => KeyAction::Intent(match kind {
                crew_core::PickerKind::Kill => Intent::Kill {
                    target_id: choice.id.clone(),
                },
                crew_core::PickerKind::Report => Intent::Report {
                    body_id: choice.id.clone(),
                },
            }),
            _ => KeyAction::Ignore,
        };
    }

    let intent = match (frame.server_overlay, code) {
        (ServerOverlay::Meeting, KeyCode::Enter) => match selected {
            Some(choice) if choice.id == SKIP_VOTE => Intent::StageVote(VoteTarget::Skip),
            Some(choice) => Intent::StageVote(VoteTarget::Player(choice.id.clone())),
            None => return KeyAction::Ignore,
        },
        (ServerOverlay::Meeting, KeyCode::Char('y')) if frame.staged_vote.is_some() => {
            Intent::ConfirmVote
        }
        (ServerOverlay::Meeting, KeyCode::Char('n') | KeyCode::Esc) => Intent::CancelVote,
        (ServerOverlay::MeetingSummary, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('d')) => {
            Intent::DismissSummary
        }
        (ServerOverlay::None, KeyCode::Enter | KeyCode::Char(' ')) => match selected {
            Some(choice) => Intent::ToggleTask {
                task_id: choice.id.clone(),
            },
            None => return KeyAction::Ignore,
        },
        (ServerOverlay::None, KeyCode::Char('x')) => Intent::OpenKillPicker,
        (ServerOverlay::None, KeyCode::Char('r')) => Intent::OpenReportPicker,
        (ServerOverlay::None, KeyCode::Char('s')) => Intent::SabotageComms,
        (ServerOverlay::None, KeyCode::Char('e')) => Intent::CallEmergency,
        (_, KeyCode::Char('R')) => Intent::StageReset,
        _ => return KeyAction::Ignore,
    };
    KeyAction::Intent(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_core::headless_session;
    use crew_proto::decode_snapshot_json;

    fn frame_for(payload: &str) -> Frame {
        let snapshot = decode_snapshot_json(payload).expect("snapshot decodes");
        let mut session = headless_session();
        session.apply_snapshot(&snapshot);
        session.frame()
    }

    #[test]
    fn task_rows_skip_placeholders() {
        let frame = frame_for(
            r#"{"status": "in_game", "tasks": {"long": [{"id": "long:1", "name": "Fuel engines"}]}}"#,
        );
        let rows = choices(&frame);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            map_key(KeyCode::Enter, &frame, rows.first()),
            KeyAction::Intent(Intent::ToggleTask {
                task_id: "long:1".into()
            })
        );
    }

    #[test]
    fn meeting_offers_skip_and_confirms_only_when_staged() {
        let frame = frame_for(
            r#"{"status": "meeting", "meeting": {"id": "m1", "endsIn": 60,
                "alivePlayers": [{"id": "p2", "name": "Rui"}]}}"#,
        );
        let rows = choices(&frame);
        assert_eq!(rows.last().map(|row| row.id.as_str()), Some(SKIP_VOTE));
        assert_eq!(
            map_key(KeyCode::Enter, &frame, rows.last()),
            KeyAction::Intent(Intent::StageVote(VoteTarget::Skip))
        );
        assert_eq!(map_key(KeyCode::Char('y'), &frame, None), KeyAction::Ignore);
        assert_eq!(map_key(KeyCode::Char('x'), &frame, None), KeyAction::Ignore);
    }

    #[test]
    fn global_keys_work_everywhere() {
        let frame = frame_for(r#"{"status": "in_game"}"#);
        assert_eq!(map_key(KeyCode::Char('q'), &frame, None), KeyAction::Quit);
        assert_eq!(map_key(KeyCode::Down, &frame, None), KeyAction::Cursor(1));
        assert_eq!(
            map_key(KeyCode::Char('x'), &frame, None),
            KeyAction::Intent(Intent::OpenKillPicker)
        );
    }
}
