use std::{io, panic};

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;

use crate::session::Session;

use super::event::Event;
use super::{EventHandler, Frontend, magnifier};

pub type CrosstermTerminal = ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stderr>>;

/// The terminal frontend. Draws on stderr so stdout stays free for the picked colour.
pub struct Tui {
    running: bool,
    terminal: CrosstermTerminal,
    pub events: EventHandler,
}

impl Tui {
    pub fn start(tick_rate: Duration) -> Result<Self> {
        let backend = CrosstermBackend::new(std::io::stderr());
        let terminal = Terminal::new(backend)?;
        let events = EventHandler::new(tick_rate);
        let tui = Self::new(terminal, events);
        Ok(tui)
    }

    pub fn new(terminal: CrosstermTerminal, events: EventHandler) -> Self {
        Self {
            terminal,
            events,
            running: false,
        }
    }

    fn reset() -> Result<()> {
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }
}

impl Frontend for Tui {
    fn enter(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        self.running = true;
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic| {
            if let Err(e) = Self::reset() {
                eprintln!("Failed to reset the terminal: {e}");
            }
            panic_hook(panic);
        }));

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        Self::reset()?;
        self.terminal.show_cursor()?;
        self.running = false;
        Ok(())
    }

    fn draw(&mut self, session: &Session) -> Result<()> {
        self.terminal
            .draw(|frame| magnifier::render(frame, session))?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event> {
        self.events.next()
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit()
            .unwrap_or_else(|e| eprintln!("Failed to exit TUI: {}", e));
    }
}
