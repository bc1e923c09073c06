//! The `tap` gesture: a down/up pair with zero pointer displacement.
//!
//! Listens for the mode's start event on the subscribed node. An accepted
//! start opens a [`GestureSession`] and subscribes once-only to move, end
//! and cancel. Move or cancel abandons the session; end fires `tap` when the
//! end coordinates equal the start coordinates exactly.
//!
//! A start arriving while a session is pending restarts it: the pending
//! session is discarded together with its move/end/cancel subscriptions.

use crate::dispatcher::EventDispatcher;
use crate::synthetic::{Notifier, SharedHandles, SyntheticEvent};
use crate::{DomEvent, Filter, InputMode, NodeId, Point};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

/// Name the gesture is registered under.
pub const TAP: &str = "tap";

const START: &str = "start";
const MOVE: &str = "move";
const END: &str = "end";
const CANCEL: &str = "cancel";

const SESSION_HANDLES: [&str; 3] = [MOVE, END, CANCEL];

/// State of one down-to-resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    /// Attached node, or the delegated match at down time.
    pub target: NodeId,
    /// Page coordinates of the down event.
    pub start: Point,
    resolved: bool,
}

impl GestureSession {
    pub fn new(target: NodeId, start: Point) -> Self {
        Self {
            target,
            start,
            resolved: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Mark resolved. Returns `false` if it already was.
    fn resolve(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }
}

/// Decide whether a down event opens a session.
///
/// Secondary-button presses and touch events with a touch count other than
/// one are ignored. `node` is the attached node; with `delegated` the
/// event's `current_target` (the filter match) is used instead.
pub fn start_session(
    mode: InputMode,
    event: &DomEvent,
    node: NodeId,
    delegated: bool,
) -> Option<GestureSession> {
    if event.button.is_some_and(|button| button.is_secondary()) {
        return None;
    }
    if let Some(touches) = &event.touches {
        if touches.len() != 1 {
            return None;
        }
    }

    let target = if delegated {
        event.current_target.unwrap_or(node)
    } else {
        node
    };

    // Simulated touch events may come without a touch list.
    let start = match (&event.touches, mode.supports_touches()) {
        (Some(touches), true) => touches[0].page,
        _ => event.page,
    };

    Some(GestureSession::new(target, start))
}

/// Resolve a session on pointer up. Returns the `tap` event to fire, if any.
pub fn finish_session(
    session: &mut GestureSession,
    mode: InputMode,
    event: &DomEvent,
) -> Option<DomEvent> {
    if !session.resolve() {
        return None;
    }

    let (end, client) = match (&event.changed_touches, mode.supports_touches()) {
        (Some(changed), true) if !changed.is_empty() => (changed[0].page, changed[0].client),
        _ => (event.page, event.client),
    };

    let start = session.start;
    if (end.x - start.x).abs() != 0.0 || (end.y - start.y).abs() != 0.0 {
        debug!(?start, ?end, "Pointer moved, no tap");
        return None;
    }

    let mut tap = event.clone();
    tap.event_type = TAP.to_string();
    tap.page = end;
    tap.client = client;
    tap.current_target = Some(session.target);
    Some(tap)
}

/// Abandon a session after a move or cancel.
pub fn cancel_session(session: &mut GestureSession) -> bool {
    session.resolve()
}

/// The `tap` synthetic event definition.
#[derive(Debug, Clone, Copy)]
pub struct TapGesture {
    mode: InputMode,
}

impl TapGesture {
    pub fn new(mode: InputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Define `tap` on `dispatcher`.
    pub fn install(self, dispatcher: &mut EventDispatcher) {
        dispatcher.define(TAP, Rc::new(self));
    }

    fn listen(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
        notifier: Notifier,
        filter: Option<Filter>,
    ) {
        let listener = Rc::new(TapListener {
            mode: self.mode,
            node,
            delegated: filter.is_some(),
            handles: handles.clone(),
            notifier,
            pending: RefCell::new(None),
            serial: Cell::new(0),
        });

        let start = self.mode.event_names().start;
        let on_start = move |d: &mut EventDispatcher, e: &DomEvent| listener.pointer_down(d, e);
        let id = match filter {
            None => dispatcher.subscribe(node, start, on_start),
            Some(filter) => dispatcher.delegate(node, start, filter, on_start),
        };
        handles.set(dispatcher, START, id);
    }
}

impl SyntheticEvent for TapGesture {
    fn on(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
        notifier: Notifier,
    ) {
        self.listen(dispatcher, node, handles, notifier, None);
    }

    fn detach(&self, dispatcher: &mut EventDispatcher, _node: NodeId, handles: &SharedHandles) {
        handles.release_all(dispatcher);
    }

    fn delegate(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
        notifier: Notifier,
        filter: Filter,
    ) {
        self.listen(dispatcher, node, handles, notifier, Some(filter));
    }
}

/// One consumer subscription to `tap`.
struct TapListener {
    mode: InputMode,
    node: NodeId,
    delegated: bool,
    handles: SharedHandles,
    notifier: Notifier,
    /// Pending session with the serial its handlers were registered for.
    pending: RefCell<Option<(u64, GestureSession)>>,
    serial: Cell<u64>,
}

impl TapListener {
    fn pointer_down(self: &Rc<Self>, d: &mut EventDispatcher, event: &DomEvent) {
        let Some(session) = start_session(self.mode, event, self.node, self.delegated) else {
            debug!(event = %event.event_type, "Down ignored");
            return;
        };

        if self.pending.borrow_mut().take().is_some() {
            debug!("Restarting pending tap session");
            self.handles.release(d, &SESSION_HANDLES);
        }

        let serial = self.serial.get().wrapping_add(1);
        self.serial.set(serial);
        debug!(target = ?session.target, start = ?session.start, serial, "Tap session started");
        *self.pending.borrow_mut() = Some((serial, session));

        let names = self.mode.event_names();
        let listener = self.clone();
        let moved = d.once(self.node, names.moved, move |d, e| {
            listener.pointer_cancel(d, e, serial)
        });
        let listener = self.clone();
        let end = d.once(self.node, names.end, move |d, e| {
            listener.pointer_up(d, e, serial)
        });
        let listener = self.clone();
        let cancel = d.once(self.node, names.cancel, move |d, e| {
            listener.pointer_cancel(d, e, serial)
        });

        self.handles.set(d, MOVE, moved);
        self.handles.set(d, END, end);
        self.handles.set(d, CANCEL, cancel);
    }

    fn pointer_cancel(&self, d: &mut EventDispatcher, event: &DomEvent, serial: u64) {
        let Some(mut session) = self.take_pending(serial) else {
            return;
        };
        self.handles.release(d, &SESSION_HANDLES);
        if cancel_session(&mut session) {
            debug!(event = %event.event_type, serial, "Tap session cancelled");
        }
    }

    fn pointer_up(&self, d: &mut EventDispatcher, event: &DomEvent, serial: u64) {
        let Some(mut session) = self.take_pending(serial) else {
            return;
        };
        self.handles.release(d, &SESSION_HANDLES);
        if let Some(tap) = finish_session(&mut session, self.mode, event) {
            debug!(page = ?tap.page, target = ?session.target, "Tap");
            self.notifier.fire(d, &tap);
        }
    }

    fn take_pending(&self, serial: u64) -> Option<GestureSession> {
        let mut pending = self.pending.borrow_mut();
        match pending.as_ref() {
            Some((current, _)) if *current == serial => pending.take().map(|(_, s)| s),
            _ => None,
        }
    }
}
