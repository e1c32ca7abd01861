mod event;
mod magnifier;
mod scripted;
mod tui;

use anyhow::Result;

use crate::session::Session;

pub use event::{Event, EventHandler};
pub use magnifier::render;
pub use scripted::ScriptedFrontend;
pub use tui::Tui;

/// Something that can show a picking session and feed it input.
pub trait Frontend {
    fn enter(&mut self) -> Result<()> {
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        Ok(())
    }

    fn draw(&mut self, session: &Session) -> Result<()>;

    /// Blocks until the next input or tick.
    fn next_event(&mut self) -> Result<Event>;
}
