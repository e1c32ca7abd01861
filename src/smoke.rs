//! End-to-end wiring check: an [`EventEmitter`] with `start`, `update` and `end`
//! listeners, fed by one picker call.

use std::cell::RefCell;
use std::fmt::Display;
use std::io::Write;
use std::rc::Rc;

use anyhow::Result;

use crate::color::Rgb;
use crate::emitter::EventEmitter;
use crate::events::{PickOutcome, PickerEvent};
use crate::params::PickerParams;

/// Describes the picker entry points, printed once at the start of a smoke run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerModule {
    pub name: &'static str,
    pub version: &'static str,
    pub exports: &'static [&'static str],
}

pub const PICKER_MODULE: PickerModule = PickerModule {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
    exports: &["init"],
};

pub fn smoke_params() -> PickerParams {
    PickerParams::new(Rgb::new(0x11, 0x22, 0x33), 3)
}

fn print_line<W: Write>(out: &Rc<RefCell<W>>, line: impl Display) {
    if let Err(e) = writeln!(out.borrow_mut(), "{line}") {
        log::warn!("Failed to write smoke output: {e}");
    }
}

/// Logs [`PICKER_MODULE`], registers the three listeners and calls `init` once
/// with an emit callback bound to the emitter.
pub fn run<W, I>(out: W, params: PickerParams, init: I) -> Result<PickOutcome>
where
    W: Write + 'static,
    I: FnOnce(&mut dyn FnMut(PickerEvent), PickerParams) -> Result<PickOutcome>,
{
    let out = Rc::new(RefCell::new(out));
    print_line(&out, format!("{PICKER_MODULE:?}"));

    let mut emitter = EventEmitter::<PickerEvent>::new();

    let o = out.clone();
    emitter.on(PickerEvent::START, move |_| print_line(&o, "picker started"));

    let o = out.clone();
    emitter.on(PickerEvent::UPDATE, move |event| print_line(&o, event));

    let o = out.clone();
    emitter.on(PickerEvent::END, move |_| print_line(&o, "Picker ended"));

    let mut emit = |event: PickerEvent| {
        emitter.emit(event.name(), &event);
    };
    init(&mut emit, params)
}
