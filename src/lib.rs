pub mod capture;
pub mod cli;
pub mod color;
pub mod config;
pub mod emitter;
pub mod events;
pub mod grid;
mod handler;
mod logging;
pub mod params;
pub mod picker;
pub mod session;
pub mod smoke;
pub mod ui;

pub use color::Rgb;
pub use emitter::EventEmitter;
pub use events::{PickOutcome, PickerEvent};
pub use params::PickerParams;
pub use picker::{init, init_with};
