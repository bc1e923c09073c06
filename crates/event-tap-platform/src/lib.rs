//! event-tap-platform: host input boundary for event-tap.
//!
//! This crate provides:
//! - A bounded raw input feed the host pushes mouse/touch events into
//! - Translation of raw input into native-named dispatcher events
//! - A pump that drains the feed into an `EventDispatcher`
//! - Input mode detection
//! - Recording persistence (JSON under the per-user data directory)
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `input_hook` - Raw input feed
//! - `translator` - Raw input to `DomEvent`
//! - `pump` - Feed-to-dispatcher driver
//! - `detect` - Input mode detection
//! - `storage` - Recording persistence

mod detect;
mod error;
mod input_hook;
mod pump;
mod storage;
mod translator;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export input feed
pub use input_hook::{open_input_feed, InputEventType, InputFeed, InputHookHandle, RawInputEvent};

pub use detect::{detect_input_mode, init_input_mode, resolve_input_mode, INPUT_MODE_ENV};
pub use pump::EventPump;
pub use translator::PointerTranslator;

// Re-export recording storage
pub use storage::{
    delete_recording_in, ensure_dir, get_app_data_dir, get_recordings_dir, list_recordings_in,
    load_recording_file, load_recording_in, save_recording_in, Recording,
};
