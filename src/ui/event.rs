use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
}

pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Spawns the polling thread. It stops on its own once the handler is dropped.
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(tick_rate);
                if event::poll(timeout).unwrap_or_default() {
                    let sent = match event::read() {
                        Ok(CrosstermEvent::Key(e)) if e.kind == event::KeyEventKind::Press => {
                            sender.send(Event::Key(e))
                        }
                        Ok(CrosstermEvent::Mouse(e)) => sender.send(Event::Mouse(e)),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if sender.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
            log::debug!("Event thread stopped");
        });
        Self { receiver }
    }

    pub fn next(&self) -> Result<Event> {
        self.receiver.recv().map_err(Into::into)
    }
}
