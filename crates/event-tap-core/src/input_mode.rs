//! Touch/mouse capability, resolved once per process.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Which family of native events the host delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Touch,
    #[default]
    Mouse,
}

/// Native event names for the four pointer phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNames {
    pub start: &'static str,
    pub moved: &'static str,
    pub end: &'static str,
    pub cancel: &'static str,
}

const TOUCH_EVENTS: EventNames = EventNames {
    start: "touchstart",
    moved: "touchmove",
    end: "touchend",
    cancel: "touchcancel",
};

const MOUSE_EVENTS: EventNames = EventNames {
    start: "mousedown",
    moved: "mousemove",
    end: "mouseup",
    cancel: "mousecancel",
};

impl InputMode {
    pub fn supports_touches(self) -> bool {
        self == InputMode::Touch
    }

    pub fn event_names(self) -> EventNames {
        match self {
            InputMode::Touch => TOUCH_EVENTS,
            InputMode::Mouse => MOUSE_EVENTS,
        }
    }
}

static INPUT_MODE: OnceLock<InputMode> = OnceLock::new();

/// Set the process-wide mode. Only the first call takes effect; the
/// effective mode is returned.
pub fn init(mode: InputMode) -> InputMode {
    *INPUT_MODE.get_or_init(|| {
        info!(?mode, "Input mode initialized");
        mode
    })
}

/// The process-wide mode. Falls back to [`InputMode::Mouse`] and locks it
/// in when `init` was never called.
pub fn current() -> InputMode {
    *INPUT_MODE.get_or_init(|| {
        let mode = InputMode::default();
        warn!(?mode, "Input mode read before init, using default");
        mode
    })
}
