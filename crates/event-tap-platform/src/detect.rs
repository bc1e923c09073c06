//! Input mode detection.

use event_tap_core::{input_mode, InputMode, TapConfig};
use tracing::{debug, warn};

/// Environment variable overriding detection: `touch` or `mouse`.
pub const INPUT_MODE_ENV: &str = "EVENT_TAP_INPUT";

/// Probe the host. Without an override the host is assumed to be mouse driven.
pub fn detect_input_mode() -> InputMode {
    match std::env::var(INPUT_MODE_ENV) {
        Ok(value) => parse_mode(&value).unwrap_or_else(|| {
            warn!(value, "Unrecognized {}, assuming mouse", INPUT_MODE_ENV);
            InputMode::Mouse
        }),
        Err(_) => {
            debug!("No {} set, assuming mouse", INPUT_MODE_ENV);
            InputMode::Mouse
        }
    }
}

/// Apply the configured setting, probing only for `auto`.
pub fn resolve_input_mode(config: &TapConfig) -> InputMode {
    config.input_mode.resolve(detect_input_mode)
}

/// Resolve and install the process-wide input mode. Returns the effective mode.
pub fn init_input_mode(config: &TapConfig) -> InputMode {
    input_mode::init(resolve_input_mode(config))
}

fn parse_mode(value: &str) -> Option<InputMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "touch" => Some(InputMode::Touch),
        "mouse" => Some(InputMode::Mouse),
        _ => None,
    }
}
