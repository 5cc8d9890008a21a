use std::collections::VecDeque;

use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crew_core::{Frame as ViewFrame, NoticeLevel, Picker, Route, ServerOverlay};

use crate::keymap::{choices, Choice};

pub struct UiState {
    pub frame: Option<ViewFrame>,
    pub cursor: usize,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            frame: None,
            cursor: 0,
            logs: VecDeque::new(),
            max_logs: 8,
        }
    }
}

impl UiState {
    pub fn push_frame(&mut self, frame: ViewFrame) {
        let rows = choices(&frame).len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
        self.frame = Some(frame);
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let rows = choices(frame).len();
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, rows as isize - 1) as usize;
    }

    pub fn selected(&self) -> Option<Choice> {
        let frame = self.frame.as_ref()?;
        choices(frame).into_iter().nth(self.cursor)
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(4),
            Constraint::Length(7),
        ])
        .split(frame.size());

    let Some(view) = state.frame.as_ref() else {
        draw_panel(frame, chunks[1], "crewlink", vec![Line::from("Connecting...")]);
        draw_logs(frame, chunks[3], state);
        return;
    };

    draw_header(frame, chunks[0], view);
    let rows = choices(view);
    let body = match view.route {
        Route::Entry => vec![Line::from(Span::styled(
            crew_core::SESSION_EXPIRED,
            Style::default().fg(Color::Red),
        ))],
        Route::Lobby => lobby_lines(view, &rows, state.cursor),
        Route::Game => game_lines(view, &rows, state.cursor),
    };
    draw_panel(frame, chunks[1], body_title(view), body);
    draw_notices(frame, chunks[2], view);
    draw_logs(frame, chunks[3], state);
}

fn body_title(view: &ViewFrame) -> &'static str {
    match (&view.picker, view.server_overlay) {
        (Picker::Kill { .. }, _) => "Choose a target",
        (Picker::Report { .. }, _) => "Report a body",
        (_, ServerOverlay::GameOver) => "Game over",
        (_, ServerOverlay::MeetingSummary) => "Meeting results",
        (_, ServerOverlay::Meeting) => "Meeting",
        _ => match view.route {
            Route::Lobby => "Lobby",
            _ => "Tasks",
        },
    }
}

fn draw_header(frame: &mut Frame, area: Rect, view: &ViewFrame) {
    let mut spans = vec![
        Span::styled(
            view.view.player_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            view.view.role_label,
            if view.view.is_impostor {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Cyan)
            },
        ),
        Span::raw(format!(
            " | tasks {:.0}%",
            view.view.progress.revealed() * 100.0
        )),
    ];
    if let Some(seconds) = view.timers.kill_cooldown {
        spans.push(Span::raw(format!(" | kill in {seconds}s")));
    }
    if view.blackout {
        spans.push(Span::styled(
            format!(
                " | COMMS DOWN {}s",
                view.timers.sabotage.unwrap_or_default()
            ),
            Style::default().fg(Color::Yellow),
        ));
    }
    let lines = vec![Line::from(spans), Line::from(Span::raw(view.view.role_hint))];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("crewlink {}", view.route.as_str()));
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn row(choice: &Choice, highlighted: bool, suffix: String) -> Line<'static> {
    let marker = if highlighted { "> " } else { "  " };
    let style = if highlighted {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{marker}{}", choice.label), style),
        Span::raw(suffix),
    ])
}

fn lobby_lines(view: &ViewFrame, rows: &[Choice], cursor: usize) -> Vec<Line<'static>> {
    let lobby = &view.lobby;
    let mut lines = vec![
        Line::from(format!("Code {} | round {}", lobby.code, lobby.round)),
        Line::from(lobby.status_message.clone()),
        Line::from(format!(
            "Players {}/{} | ready {} | cooldown {}s",
            lobby.player_count, lobby.required_players, lobby.ready_count, lobby.config.kill_cooldown
        )),
    ];
    for (index, choice) in rows.iter().enumerate() {
        let ready = lobby
            .players
            .iter()
            .find(|player| player.id == choice.id)
            .map(|player| if player.ready { " (ready)" } else { "" })
            .unwrap_or_default();
        lines.push(row(choice, index == cursor, ready.to_string()));
    }
    lines.push(Line::from(hints(&[
        ("space", "ready", view.controls.ready),
        ("g", "start", view.controls.start),
        ("< >", "players", view.controls.config),
        ("- +", "cooldown", view.controls.config),
        ("K", "kick", view.controls.config),
    ])));
    lines
}

fn game_lines(view: &ViewFrame, rows: &[Choice], cursor: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match (&view.picker, view.server_overlay) {
        (Picker::Kill { .. }, _) | (Picker::Report { .. }, _) => {
            if let Picker::Report {
                inline_error: Some(message),
                ..
            } = &view.picker
            {
                lines.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
            for (index, choice) in rows.iter().enumerate() {
                lines.push(row(choice, index == cursor, String::new()));
            }
            lines.push(Line::from("enter confirm | esc close"));
        }
        (_, ServerOverlay::GameOver) => {
            let headline = view
                .view
                .game_over
                .as_ref()
                .map(|over| over.headline())
                .unwrap_or_default();
            lines.push(Line::from(headline));
        }
        (_, ServerOverlay::MeetingSummary) => {
            if let Some(summary) = view.view.meeting_summary.as_ref() {
                for tally in &summary.votes {
                    lines.push(Line::from(format!("{:>2}  {}", tally.count, tally.label)));
                }
                if let Some(ejected) = summary.ejected.as_ref() {
                    lines.push(Line::from(format!("{} was ejected.", ejected.name)));
                }
            }
            lines.push(Line::from("enter dismiss"));
        }
        (_, ServerOverlay::Meeting) => {
            if let Some(seconds) = view.timers.meeting {
                lines.push(Line::from(format!("Meeting ends in {seconds}s")));
            }
            if let Some(status) = view.vote_status() {
                lines.push(Line::from(status));
            }
            for (index, choice) in rows.iter().enumerate() {
                let staged = if view.staged_vote.as_deref() == Some(choice.id.as_str()) {
                    " [staged, y to confirm]"
                } else {
                    ""
                };
                lines.push(row(choice, index == cursor, staged.to_string()));
            }
        }
        (_, ServerOverlay::None) => {
            let mut index = 0;
            for group in &view.view.tasks {
                lines.push(Line::from(Span::styled(
                    group.label,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                if let Some(placeholder) = group.placeholder() {
                    lines.push(Line::from(format!("  {placeholder}")));
                }
                for task in &group.items {
                    let mark = if task.done { "[x]" } else { "[ ]" };
                    let busy = if view.controls.busy_tasks.contains(&task.id) {
                        " ..."
                    } else {
                        ""
                    };
                    let choice = Choice {
                        id: task.id.clone(),
                        label: format!("{mark} {}", task.name),
                    };
                    lines.push(row(&choice, index == cursor, busy.to_string()));
                    index += 1;
                }
            }
            if view.view.is_medic {
                lines.push(Line::from(Span::styled(
                    "Vitals",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for entry in &view.view.vitals {
                    let state = match (entry.alive, entry.left_game) {
                        (_, true) => "left",
                        (true, false) => "alive",
                        (false, false) => "dead",
                    };
                    lines.push(Line::from(format!("  {} {state}", entry.name)));
                }
            }
            if let Some(note) = view.view.death_note.as_ref() {
                lines.push(Line::from(Span::styled(
                    note.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(hints(&[
                ("x", "kill", view.controls.kill),
                ("s", "sabotage", view.controls.sabotage),
                ("r", "report", view.controls.report),
                ("e", "emergency", view.controls.emergency),
            ])));
        }
    }
    if view.reset_staged {
        lines.push(Line::from(Span::styled(
            "Reset the game? y / n",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn hints(entries: &[(&'static str, &'static str, bool)]) -> Vec<Span<'static>> {
    entries
        .iter()
        .flat_map(|(key, label, enabled)| {
            let style = if *enabled {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(*key, style), Span::raw(format!(" {label}  "))]
        })
        .collect()
}

fn draw_notices(frame: &mut Frame, area: Rect, view: &ViewFrame) {
    let lines: Vec<Line> = view
        .notices
        .iter()
        .take(2)
        .map(|notice| {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
        })
        .collect();
    draw_panel(frame, area, "Notices", lines);
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry.clone())))
        .collect();
    draw_panel(frame, area, "Logs", lines);
}

fn draw_panel(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}
