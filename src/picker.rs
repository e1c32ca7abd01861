use anyhow::{Context, Result};

use crate::capture::{CaptureSource, TestPatternSource};
use crate::config::Settings;
use crate::events::{PickOutcome, PickerEvent};
use crate::params::PickerParams;
use crate::session::Session;
use crate::ui::{Frontend, Tui};

/// Runs an interactive picker in the terminal.
///
/// `emit` receives every [`PickerEvent`] as it happens: `start`, then an
/// `update` carrying `params.previous_color`, an `update` each time the colour
/// under the cursor changes, and finally `end`.
pub fn init(emit: impl FnMut(PickerEvent), params: PickerParams) -> Result<PickOutcome> {
    let settings = Settings::load()?;
    let source = open_source(&settings)?;
    let mut tui = Tui::start(settings.tick_rate())?;
    init_with(&mut tui, source, emit, params, &settings)
}

/// Like [`init`], with the frontend, capture source and settings supplied by the caller.
pub fn init_with<U: Frontend>(
    ui: &mut U,
    source: CaptureSource,
    mut emit: impl FnMut(PickerEvent),
    params: PickerParams,
    settings: &Settings,
) -> Result<PickOutcome> {
    let mut session = Session::new(source, params, settings)?;
    ui.enter()?;
    let result = run_session(ui, &mut session, &mut emit);
    ui.exit()?;
    result
}

fn run_session<U: Frontend>(
    ui: &mut U,
    session: &mut Session,
    emit: &mut impl FnMut(PickerEvent),
) -> Result<PickOutcome> {
    session.start(emit);
    loop {
        if let Some(outcome) = session.outcome() {
            return Ok(outcome);
        }
        ui.draw(session)?;
        let event = ui.next_event()?;
        session.handle(event, emit);
    }
}

/// Opens the configured capture file, or the built-in test pattern when there is none.
pub fn open_source(settings: &Settings) -> Result<CaptureSource> {
    match &settings.capture_file {
        Some(path) => CaptureSource::open(path, settings.raw_frame.as_ref())
            .with_context(|| "Failed to open capture source"),
        None => {
            log::info!("No capture file configured, using the test pattern");
            Ok(TestPatternSource::default().into())
        }
    }
}
