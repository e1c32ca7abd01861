//! The picking state machine.
//!
//! A session owns the capture source and the cursor, turns input into cursor
//! moves and reports colours through an `emit` callback. Event order for one
//! session is always `start`, `update(previous colour)`, any number of
//! `update`s, then exactly one `end`.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::capture::{CaptureSource, ScreenSource};
use crate::color::Rgb;
use crate::config::Settings;
use crate::events::{PickOutcome, PickerEvent};
use crate::grid::{CaptureBounds, PixelGrid, Point};
use crate::params::PickerParams;
use crate::ui::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Finished(PickOutcome),
}

#[derive(Debug)]
pub struct Session {
    source: CaptureSource,
    params: PickerParams,
    cursor: Point,
    grid: PixelGrid,
    last_reported: Option<Rgb>,
    ticks: u64,
    capture_ratio: u32,
    fast_step: u32,
    state: State,
}

impl Session {
    pub fn new(source: CaptureSource, params: PickerParams, settings: &Settings) -> Result<Self> {
        params.validate()?;
        let (width, height) = source.dimensions();
        let cursor = Point::new(i64::from(width / 2), i64::from(height / 2));
        let grid = source.capture(&CaptureBounds::centered(cursor, params.grid_size));
        let size = params.grid_size;
        log::debug!("New session on a {width}x{height} frame, grid {size}x{size}");
        Ok(Self {
            source,
            params,
            cursor,
            grid,
            last_reported: None,
            ticks: 0,
            capture_ratio: settings.capture_ratio.max(1),
            fast_step: settings.fast_step,
            state: State::Idle,
        })
    }

    pub fn params(&self) -> &PickerParams {
        &self.params
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Colour under the centre cell. The cursor never leaves the frame, so the
    /// fallback only covers an empty source.
    pub fn current_color(&self) -> Rgb {
        self.grid.center().unwrap_or(self.params.previous_color)
    }

    pub fn outcome(&self) -> Option<PickOutcome> {
        match self.state {
            State::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn start(&mut self, emit: &mut impl FnMut(PickerEvent)) {
        if self.state != State::Idle {
            return;
        }
        self.state = State::Running;
        emit(PickerEvent::Start);
        let previous = self.params.previous_color;
        self.last_reported = Some(previous);
        emit(PickerEvent::Update { color: previous });
    }

    pub fn handle(&mut self, event: Event, emit: &mut impl FnMut(PickerEvent)) {
        if !self.is_running() {
            return;
        }
        match event {
            Event::Tick => self.tick(emit),
            Event::Key(key_event) => self.handle_key(key_event, emit),
            Event::Mouse(mouse_event) => self.handle_mouse(mouse_event, emit),
        }
    }

    fn tick(&mut self, emit: &mut impl FnMut(PickerEvent)) {
        if self.ticks % u64::from(self.capture_ratio) == 0 {
            self.refresh(emit);
        }
        self.ticks += 1;
    }

    fn handle_key(&mut self, key_event: KeyEvent, emit: &mut impl FnMut(PickerEvent)) {
        let fast = key_event.modifiers.contains(KeyModifiers::SHIFT);
        let step = if fast { i64::from(self.fast_step) } else { 1 };
        match key_event.code {
            KeyCode::Esc => self.finish(false, emit),
            KeyCode::Enter | KeyCode::Char(' ') => self.finish(true, emit),
            KeyCode::Char('c' | 'd' | 'z')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.finish(false, emit)
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_by(-step, 0, emit),
            KeyCode::Right | KeyCode::Char('l') => self.move_by(step, 0, emit),
            KeyCode::Up | KeyCode::Char('k') => self.move_by(0, -step, emit),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(0, step, emit),
            KeyCode::Char('H') => self.move_by(-i64::from(self.fast_step), 0, emit),
            KeyCode::Char('L') => self.move_by(i64::from(self.fast_step), 0, emit),
            KeyCode::Char('K') => self.move_by(0, -i64::from(self.fast_step), emit),
            KeyCode::Char('J') => self.move_by(0, i64::from(self.fast_step), emit),
            code => log::trace!("Ignoring key {code:?}"),
        }
    }

    fn handle_mouse(&mut self, mouse_event: MouseEvent, emit: &mut impl FnMut(PickerEvent)) {
        match mouse_event.kind {
            MouseEventKind::Down(button) => log::debug!("Mouse button down: {button:?}"),
            MouseEventKind::Up(button) => {
                log::debug!("Mouse button up: {button:?}");
                self.finish(true, emit);
            }
            _ => {}
        }
    }

    fn move_by(&mut self, dx: i64, dy: i64, emit: &mut impl FnMut(PickerEvent)) {
        let (width, height) = self.source.dimensions();
        let x = (self.cursor.x + dx).clamp(0, i64::from(width) - 1);
        let y = (self.cursor.y + dy).clamp(0, i64::from(height) - 1);
        if (x, y) == (self.cursor.x, self.cursor.y) {
            return;
        }
        self.cursor = Point::new(x, y);
        self.refresh(emit);
    }

    fn refresh(&mut self, emit: &mut impl FnMut(PickerEvent)) {
        self.grid = self
            .source
            .capture(&CaptureBounds::centered(self.cursor, self.params.grid_size));
        let color = self.current_color();
        if self.last_reported != Some(color) {
            self.last_reported = Some(color);
            emit(PickerEvent::Update { color });
        }
    }

    fn finish(&mut self, picked: bool, emit: &mut impl FnMut(PickerEvent)) {
        let color = self.current_color();
        let outcome = if picked {
            PickOutcome::Picked(color)
        } else {
            PickOutcome::Cancelled(color)
        };
        log::info!("Picker finished: {outcome:?}");
        self.state = State::Finished(outcome);
        emit(PickerEvent::End(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameSource, TestPatternSource};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn session(params: PickerParams) -> Session {
        Session::new(
            TestPatternSource::new(256, 256).into(),
            params,
            &Settings::default(),
        )
        .unwrap()
    }

    fn collect(session: &mut Session, events: &[Event]) -> Vec<PickerEvent> {
        let mut out = Vec::new();
        let mut emit = |e: PickerEvent| out.push(e);
        session.start(&mut emit);
        for event in events {
            session.handle(*event, &mut emit);
        }
        out
    }

    #[test]
    fn test_start_reports_previous_color_first() {
        let previous = Rgb::new(0x11, 0x22, 0x33);
        let mut s = session(PickerParams::new(previous, 3));
        let events = collect(&mut s, &[]);
        assert_eq!(
            events,
            vec![PickerEvent::Start, PickerEvent::Update { color: previous }]
        );
    }

    #[test]
    fn test_tick_reports_sampled_color_once() {
        let mut s = session(PickerParams::new(Rgb::new(0x11, 0x22, 0x33), 3));
        let events = collect(&mut s, &[Event::Tick, Event::Tick, Event::Tick]);

        // cursor starts at (128, 128) on the gradient
        let sampled = Rgb::new(128, 128, 0x80);
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], PickerEvent::Update { color: sampled });
    }

    #[test]
    fn test_moves_and_confirm() {
        let mut s = session(PickerParams::new(Rgb::default(), 3));
        let events = collect(
            &mut s,
            &[key(KeyCode::Right), key(KeyCode::Char('j')), key(KeyCode::Enter)],
        );

        assert_eq!(s.cursor(), Point::new(129, 129));
        let expected = Rgb::new(129, 129, 0x80);
        assert_eq!(s.outcome(), Some(PickOutcome::Picked(expected)));
        assert_eq!(events.last(), Some(&PickerEvent::End(PickOutcome::Picked(expected))));
    }

    #[test]
    fn test_shift_moves_fast_step() {
        let mut s = session(PickerParams::default());
        collect(
            &mut s,
            &[
                Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)),
                key(KeyCode::Char('K')),
            ],
        );
        assert_eq!(s.cursor(), Point::new(118, 118));
    }

    #[test]
    fn test_cursor_is_clamped_to_frame() {
        let frame = FrameSource::from_rgb(2, 1, vec![Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)]).unwrap();
        let mut s = Session::new(frame.into(), PickerParams::new(Rgb::default(), 3), &Settings::default())
            .unwrap();
        collect(&mut s, &[key(KeyCode::Right), key(KeyCode::Right), key(KeyCode::Up)]);
        assert_eq!(s.cursor(), Point::new(1, 0));
        assert_eq!(s.current_color(), Rgb::new(2, 2, 2));
        assert_eq!(s.grid().cell(2, 1), None);
    }

    #[test]
    fn test_space_confirms() {
        let mut s = session(PickerParams::default());
        let events = collect(&mut s, &[key(KeyCode::Char(' '))]);
        let expected = PickOutcome::Picked(Rgb::new(128, 128, 0x80));
        assert_eq!(s.outcome(), Some(expected));
        assert_eq!(events.last(), Some(&PickerEvent::End(expected)));
    }

    #[test]
    fn test_control_keys_cancel() {
        for c in ['c', 'd', 'z'] {
            let mut s = session(PickerParams::default());
            collect(
                &mut s,
                &[Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))],
            );
            assert_eq!(
                s.outcome(),
                Some(PickOutcome::Cancelled(Rgb::new(128, 128, 0x80))),
                "ctrl-{c} should cancel"
            );
        }
    }

    #[test]
    fn test_fast_step_is_clamped_at_top_left() {
        let mut s = Session::new(
            TestPatternSource::new(7, 7).into(),
            PickerParams::new(Rgb::default(), 3),
            &Settings::default(),
        )
        .unwrap();
        assert_eq!(s.cursor(), Point::new(3, 3));
        collect(&mut s, &[key(KeyCode::Char('H')), key(KeyCode::Char('K'))]);
        assert_eq!(s.cursor(), Point::new(0, 0));
        assert_eq!(s.current_color(), Rgb::new(0, 0, 0x80));
        assert_eq!(s.grid().cell(0, 0), None);
    }

    #[test]
    fn test_cancel_reports_last_color() {
        let mut s = session(PickerParams::default());
        let events = collect(&mut s, &[key(KeyCode::Esc)]);
        assert_eq!(
            events.last(),
            Some(&PickerEvent::End(PickOutcome::Cancelled(Rgb::new(128, 128, 0x80))))
        );
    }

    #[test]
    fn test_end_is_emitted_once() {
        let mut s = session(PickerParams::default());
        let events = collect(
            &mut s,
            &[key(KeyCode::Enter), key(KeyCode::Esc), key(KeyCode::Left), Event::Tick],
        );
        let ends = events.iter().filter(|e| e.name() == "end").count();
        assert_eq!(ends, 1);
        assert!(s.outcome().unwrap().is_picked());
        assert_eq!(s.cursor(), Point::new(128, 128));
    }

    #[test]
    fn test_mouse_release_confirms() {
        let mut s = session(PickerParams::default());
        let release = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Up(crossterm::event::MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        collect(&mut s, &[release]);
        assert!(s.outcome().unwrap().is_picked());
    }

    #[test]
    fn test_invalid_params_are_rejected_before_start() {
        let result = Session::new(
            TestPatternSource::default().into(),
            PickerParams::new(Rgb::default(), 4),
            &Settings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_ratio_skips_ticks() {
        let settings = Settings {
            capture_ratio: 3,
            ..Settings::default()
        };
        let mut s =
            Session::new(TestPatternSource::default().into(), PickerParams::default(), &settings)
                .unwrap();
        let mut emitted = 0;
        let mut emit = |_: PickerEvent| emitted += 1;
        s.start(&mut emit);
        s.handle(Event::Tick, &mut emit);
        assert_eq!(s.ticks, 1);
        s.handle(Event::Tick, &mut emit);
        s.handle(Event::Tick, &mut emit);
        assert_eq!(s.ticks, 3);
        // start + previous colour + first capture
        assert_eq!(emitted, 3);
    }
}
