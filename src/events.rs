use serde::Serialize;
use std::fmt;

use crate::color::Rgb;

/// How a picking session finished. Both variants carry the colour that was under
/// the centre of the grid at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "color", rename_all = "lowercase")]
pub enum PickOutcome {
    Picked(Rgb),
    Cancelled(Rgb),
}

impl PickOutcome {
    pub fn color(&self) -> Rgb {
        match self {
            PickOutcome::Picked(c) | PickOutcome::Cancelled(c) => *c,
        }
    }

    pub fn is_picked(&self) -> bool {
        matches!(self, PickOutcome::Picked(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PickerEvent {
    Start,
    Update { color: Rgb },
    End(PickOutcome),
}

impl PickerEvent {
    pub const START: &'static str = "start";
    pub const UPDATE: &'static str = "update";
    pub const END: &'static str = "end";

    /// The name this event is emitted under.
    pub fn name(&self) -> &'static str {
        match self {
            PickerEvent::Start => Self::START,
            PickerEvent::Update { .. } => Self::UPDATE,
            PickerEvent::End(_) => Self::END,
        }
    }
}

impl fmt::Display for PickerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickerEvent::Start => write!(f, "start"),
            PickerEvent::Update { color } => write!(f, "{color}"),
            PickerEvent::End(PickOutcome::Picked(c)) => write!(f, "picked {c}"),
            PickerEvent::End(PickOutcome::Cancelled(c)) => write!(f, "cancelled {c}"),
        }
    }
}
