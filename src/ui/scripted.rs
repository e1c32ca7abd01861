use std::collections::VecDeque;

use anyhow::{bail, Result};
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::{Event, Frontend};
use crate::session::Session;

/// Replays a fixed list of input events without touching the terminal.
///
/// Scripts are whitespace separated words: `left right up down`, `h j k l`,
/// `H J K L` (fast moves), `enter`, `space`, `esc`, `ctrl-c`, `click`, `tick`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedFrontend {
    events: VecDeque<Event>,
    draws: usize,
}

impl ScriptedFrontend {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            draws: 0,
        }
    }

    pub fn from_script(script: &str) -> Result<Self> {
        let events = script
            .split_whitespace()
            .map(parse_word)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(events))
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

fn parse_word(word: &str) -> Result<Event> {
    let none = KeyModifiers::NONE;
    let event = match word {
        "tick" => Event::Tick,
        "left" => key(KeyCode::Left, none),
        "right" => key(KeyCode::Right, none),
        "up" => key(KeyCode::Up, none),
        "down" => key(KeyCode::Down, none),
        "enter" => key(KeyCode::Enter, none),
        "space" => key(KeyCode::Char(' '), none),
        "esc" => key(KeyCode::Esc, none),
        "ctrl-c" => key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        "click" => Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: none,
        }),
        "h" | "j" | "k" | "l" | "H" | "J" | "K" | "L" => {
            let c = word.chars().next().unwrap_or_default();
            let modifiers = if c.is_ascii_uppercase() {
                KeyModifiers::SHIFT
            } else {
                none
            };
            key(KeyCode::Char(c), modifiers)
        }
        _ => bail!("Unknown key in script: {word:?}"),
    };
    Ok(event)
}

impl Frontend for ScriptedFrontend {
    fn draw(&mut self, _session: &Session) -> Result<()> {
        self.draws += 1;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event> {
        match self.events.pop_front() {
            Some(event) => Ok(event),
            None => bail!("Input script ended before the picker finished"),
        }
    }
}
