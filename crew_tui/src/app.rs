use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crew_core::{Frame as ViewFrame, Intent};

use crate::keymap::{map_key, KeyAction};
use crate::ui::{draw_ui, UiState};

pub struct CrewApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    frames: UnboundedReceiver<ViewFrame>,
    intents: UnboundedSender<Intent>,
    log_receiver: Receiver<String>,
}

impl CrewApp {
    pub fn new(
        frames: UnboundedReceiver<ViewFrame>,
        intents: UnboundedSender<Intent>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::default(),
            frames,
            intents,
            log_receiver,
        })
    }

    /// Runs until the player quits. Dropping `self` closes the intent
    /// channel, which stops the network runtime.
    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now();
        let mut dirty = true;

        loop {
            while let Ok(frame) = self.frames.try_recv() {
                self.ui_state.push_frame(frame);
                dirty = true;
            }

            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
                dirty = true;
            }

            if dirty && last_draw.elapsed() >= Duration::from_millis(50) {
                self.terminal.draw(|frame| draw_ui(frame, &self.ui_state))?;
                last_draw = Instant::now();
                dirty = false;
            }

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(view) = self.ui_state.frame.as_ref() else {
                if matches!(key.code, crossterm::event::KeyCode::Char('q')) {
                    break;
                }
                continue;
            };
            let selected = self.ui_state.selected();
            match map_key(key.code, view, selected.as_ref()) {
                KeyAction::Quit => break,
                KeyAction::Cursor(delta) => {
                    self.ui_state.move_cursor(delta);
                    dirty = true;
                }
                KeyAction::Intent(intent) => {
                    debug!(target: "crewlink::ui", ?intent, "key.intent");
                    if self.intents.send(intent).is_err() {
                        warn!(target: "crewlink::ui", "runtime stopped; exiting");
                        break;
                    }
                }
                KeyAction::Ignore => {}
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }
}
