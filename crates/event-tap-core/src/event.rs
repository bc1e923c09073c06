//! Event facade delivered to handlers.

use crate::{NodeId, Point};
use serde::{Deserialize, Serialize};

/// Mouse button reported by a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Unknown,
}

impl MouseButton {
    /// The context-menu button. Gestures ignore presses of it.
    pub fn is_secondary(self) -> bool {
        self == MouseButton::Right
    }
}

/// One contact point of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchPoint {
    pub page: Point,
    pub client: Point,
}

impl TouchPoint {
    pub fn at(page: Point) -> Self {
        Self { page, client: page }
    }
}

/// A native or synthetic event.
///
/// `touches` and `changed_touches` are `None` for mouse events and for
/// simulated touch events that carry no touch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    pub event_type: String,
    /// Element the event was dispatched at.
    #[serde(default)]
    pub target: Option<NodeId>,
    /// Element the current handler is bound to, or the delegated match.
    #[serde(default)]
    pub current_target: Option<NodeId>,
    #[serde(default)]
    pub page: Point,
    #[serde(default)]
    pub client: Point,
    #[serde(default)]
    pub button: Option<MouseButton>,
    #[serde(default)]
    pub touches: Option<Vec<TouchPoint>>,
    #[serde(default)]
    pub changed_touches: Option<Vec<TouchPoint>>,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            target: None,
            current_target: None,
            page: Point::default(),
            client: Point::default(),
            button: None,
            touches: None,
            changed_touches: None,
        }
    }

    /// Mouse event at `page`, with client coordinates equal to page ones.
    pub fn mouse(event_type: impl Into<String>, page: Point, button: Option<MouseButton>) -> Self {
        Self {
            page,
            client: page,
            button,
            ..Self::new(event_type)
        }
    }

    /// Touch event. Page/client of the event mirror the first changed touch.
    pub fn touch(
        event_type: impl Into<String>,
        touches: Vec<TouchPoint>,
        changed_touches: Vec<TouchPoint>,
    ) -> Self {
        let first = changed_touches.first().copied().unwrap_or_default();
        Self {
            page: first.page,
            client: first.client,
            touches: Some(touches),
            changed_touches: Some(changed_touches),
            ..Self::new(event_type)
        }
    }

    pub fn with_client(mut self, client: Point) -> Self {
        self.client = client;
        self
    }
}
