//! Drives raw input into a dispatcher.

use crate::{InputHookHandle, PointerTranslator, RawInputEvent};
use event_tap_core::{EventDispatcher, NodeId};
use tracing::trace;

/// Pairs an input handle with a translator and dispatches at a fixed target.
pub struct EventPump {
    handle: InputHookHandle,
    translator: PointerTranslator,
}

impl EventPump {
    pub fn new(handle: InputHookHandle, translator: PointerTranslator) -> Self {
        Self { handle, translator }
    }

    /// Dispatch every pending raw event. Returns how many were dispatched.
    pub fn pump(&mut self, dispatcher: &mut EventDispatcher, target: NodeId) -> usize {
        let events = self.handle.drain();
        let count = events.len();
        for raw in events {
            self.dispatch_one(dispatcher, target, raw);
        }
        count
    }

    /// Block on the feed until every sender is dropped.
    pub fn run_until_closed(&mut self, dispatcher: &mut EventDispatcher, target: NodeId) -> usize {
        let mut count = 0;
        while let Some(raw) = self.handle.recv() {
            self.dispatch_one(dispatcher, target, raw);
            count += 1;
        }
        count
    }

    pub fn translator(&self) -> &PointerTranslator {
        &self.translator
    }

    fn dispatch_one(&mut self, dispatcher: &mut EventDispatcher, target: NodeId, raw: RawInputEvent) {
        let event = self.translator.translate(&raw.event);
        trace!(timestamp_ms = raw.timestamp_ms, event = %event.event_type, "Pumping input");
        dispatcher.dispatch(target, event);
    }
}
