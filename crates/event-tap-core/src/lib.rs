//! event-tap-core: element tree, event dispatcher and the `tap` gesture.
//!
//! Design goal: keep this crate host-agnostic. Raw input capture and
//! translation live in `event-tap-platform`.
//!
//! ## Module Structure
//!
//! - `node` - element arena with parent links
//! - `selector` - simple selectors used as delegation filters
//! - `event` - event facade shared by native and synthetic events
//! - `dispatcher` - subscribe / once / delegate / detach / dispatch
//! - `synthetic` - synthetic event definitions registered by name
//! - `tap` - the tap gesture detector
//! - `input_mode` - touch or mouse, resolved once per process
//! - `config` - YAML configuration

mod config;
mod dispatcher;
mod error;
mod event;
pub mod input_mode;
mod node;
mod selector;
mod synthetic;
mod tap;

pub use config::{load_config, load_config_or_default, parse_config, InputModeSetting, TapConfig};
pub use dispatcher::{EventDispatcher, Handler, SubscriptionId};
pub use error::{CoreError, CoreResult};
pub use event::{DomEvent, MouseButton, TouchPoint};
pub use input_mode::{EventNames, InputMode};
pub use node::{Ancestors, NodeData, NodeId, NodeTree};
pub use selector::{Filter, Selector};
pub use synthetic::{Notifier, SharedHandles, SubscriptionHandles, SyntheticEvent};
pub use tap::{cancel_session, finish_session, start_session, GestureSession, TapGesture, TAP};

use serde::{Deserialize, Serialize};

/// Page or client coordinates in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}
