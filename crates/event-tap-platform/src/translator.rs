//! Translation of raw host input into dispatcher events.

use crate::InputEventType;
use event_tap_core::{DomEvent, MouseButton, Point, TouchPoint};

/// Converts [`InputEventType`] into native-named [`DomEvent`]s.
///
/// Tracks the last pointer position so button events reported without
/// coordinates land where the pointer is.
#[derive(Debug, Clone, Default)]
pub struct PointerTranslator {
    scroll_offset: Point,
    last_position: Point,
}

impl PointerTranslator {
    /// `scroll_offset` is subtracted from page coordinates to get client ones.
    pub fn new(scroll_offset: Point) -> Self {
        Self {
            scroll_offset,
            last_position: Point::default(),
        }
    }

    /// Get the last known pointer position.
    pub fn last_position(&self) -> Point {
        self.last_position
    }

    pub fn translate(&mut self, event: &InputEventType) -> DomEvent {
        match event {
            InputEventType::MouseMove { x, y } => {
                self.last_position = Point::new(*x, *y);
                self.mouse("mousemove", self.last_position, None)
            }
            InputEventType::MouseDown { position, button } => {
                let page = self.resolve(*position);
                self.mouse("mousedown", page, Some(*button))
            }
            InputEventType::MouseUp { position, button } => {
                let page = self.resolve(*position);
                self.mouse("mouseup", page, Some(*button))
            }
            InputEventType::MouseCancel => self.mouse("mousecancel", self.last_position, None),
            InputEventType::TouchStart { touches, changed } => {
                self.touch("touchstart", touches, changed)
            }
            InputEventType::TouchMove { touches, changed } => {
                self.touch("touchmove", touches, changed)
            }
            InputEventType::TouchEnd { touches, changed } => {
                self.touch("touchend", touches, changed)
            }
            InputEventType::TouchCancel { touches, changed } => {
                self.touch("touchcancel", touches, changed)
            }
        }
    }

    fn resolve(&mut self, position: Option<Point>) -> Point {
        if let Some(position) = position {
            self.last_position = position;
        }
        self.last_position
    }

    fn client(&self, page: Point) -> Point {
        page.offset_by(-self.scroll_offset.x, -self.scroll_offset.y)
    }

    fn mouse(&self, name: &str, page: Point, button: Option<MouseButton>) -> DomEvent {
        DomEvent::mouse(name, page, button).with_client(self.client(page))
    }

    fn touch(&mut self, name: &str, touches: &[Point], changed: &[Point]) -> DomEvent {
        let to_points = |points: &[Point]| -> Vec<TouchPoint> {
            points
                .iter()
                .map(|&page| TouchPoint {
                    page,
                    client: self.client(page),
                })
                .collect()
        };
        let event = DomEvent::touch(name, to_points(touches), to_points(changed));
        if let Some(first) = changed.first() {
            self.last_position = *first;
        }
        event
    }
}
