//! Raw input feed from the host.
//!
//! The host side (a window event loop, a touch driver, a recording) pushes
//! [`RawInputEvent`]s through an [`InputFeed`]; the thread that owns the
//! dispatcher drains them from the paired [`InputHookHandle`].

use crate::{PlatformError, PlatformResult};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use event_tap_core::{MouseButton, Point};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

/// A raw input event pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// Milliseconds since the feed was opened.
    pub timestamp_ms: u64,
    /// The event type.
    pub event: InputEventType,
}

/// Types of input events we accept.
///
/// Mouse button events may come without a position (some hooks only report
/// the button); the last known pointer position is used for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEventType {
    /// Pointer moved to position.
    MouseMove { x: f64, y: f64 },
    /// Mouse button pressed.
    MouseDown {
        #[serde(default)]
        position: Option<Point>,
        button: MouseButton,
    },
    /// Mouse button released.
    MouseUp {
        #[serde(default)]
        position: Option<Point>,
        button: MouseButton,
    },
    /// Host aborted the pointer interaction.
    MouseCancel,
    /// Finger(s) down. `touches` are all current contacts, in page coordinates.
    TouchStart { touches: Vec<Point>, changed: Vec<Point> },
    TouchMove { touches: Vec<Point>, changed: Vec<Point> },
    TouchEnd { touches: Vec<Point>, changed: Vec<Point> },
    TouchCancel { touches: Vec<Point>, changed: Vec<Point> },
}

/// Sending half, owned by the host.
#[derive(Clone)]
pub struct InputFeed {
    event_tx: Sender<RawInputEvent>,
    start_time: Instant,
}

impl InputFeed {
    /// Push an event stamped with the time since the feed was opened.
    pub fn push(&self, event: InputEventType) -> PlatformResult<()> {
        let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
        self.send(RawInputEvent {
            timestamp_ms,
            event,
        })
    }

    /// Push a pre-stamped event (e.g. from a recording).
    pub fn send(&self, event: RawInputEvent) -> PlatformResult<()> {
        self.event_tx.try_send(event).map_err(|e| {
            warn!("Failed to send input event: {}", e);
            match e {
                TrySendError::Full(_) => PlatformError::FeedFull,
                TrySendError::Disconnected(_) => PlatformError::FeedClosed,
            }
        })
    }
}

/// Receiving half, owned by the dispatcher thread.
pub struct InputHookHandle {
    event_rx: Receiver<RawInputEvent>,
}

impl InputHookHandle {
    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Option<RawInputEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until an event arrives. `None` once every feed is dropped and
    /// the queue is empty.
    pub fn recv(&self) -> Option<RawInputEvent> {
        self.event_rx.recv().ok()
    }

    /// Receive all pending events.
    pub fn drain(&self) -> Vec<RawInputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn pending(&self) -> usize {
        self.event_rx.len()
    }
}

/// Open a bounded input feed.
pub fn open_input_feed(capacity: usize) -> (InputFeed, InputHookHandle) {
    let (event_tx, event_rx) = bounded(capacity);
    (
        InputFeed {
            event_tx,
            start_time: Instant::now(),
        },
        InputHookHandle { event_rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_is_bounded() {
        let (feed, handle) = open_input_feed(2);
        feed.push(InputEventType::MouseMove { x: 1.0, y: 1.0 }).unwrap();
        feed.push(InputEventType::MouseCancel).unwrap();
        assert!(matches!(
            feed.push(InputEventType::MouseCancel),
            Err(PlatformError::FeedFull)
        ));

        assert_eq!(handle.pending(), 2);
        assert_eq!(handle.drain().len(), 2);
        assert!(handle.try_recv().is_none());
    }

    #[test]
    fn test_closed_feed() {
        let (feed, handle) = open_input_feed(4);
        drop(handle);
        assert!(matches!(
            feed.push(InputEventType::MouseCancel),
            Err(PlatformError::FeedClosed)
        ));
    }

    #[test]
    fn test_recv_ends_when_feed_dropped() {
        let (feed, handle) = open_input_feed(4);
        feed.push(InputEventType::MouseCancel).unwrap();
        drop(feed);
        assert!(handle.recv().is_some());
        assert!(handle.recv().is_none());
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"timestamp_ms":5,"event":{"type":"MouseDown","button":"Left"}}"#;
        let event: RawInputEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.event,
            InputEventType::MouseDown {
                position: None,
                button: MouseButton::Left
            }
        );
    }
}
