//! Synthetic events layered on top of native ones.
//!
//! A synthetic event is registered with [`EventDispatcher::define`] under a
//! name. Subscribing to that name hands the definition a fresh
//! [`SharedHandles`] bag and a [`Notifier`]; the definition subscribes to
//! whatever native events it needs and fires the notifier when its gesture
//! completes. Detaching the consumer's handle calls back into the
//! definition so it can release everything it holds.

use crate::dispatcher::{EventDispatcher, Handler, SubscriptionId};
use crate::{DomEvent, Filter, NodeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Lifecycle operations of a synthetic event.
pub trait SyntheticEvent {
    /// Direct subscription on `node`.
    fn on(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
        notifier: Notifier,
    );

    fn detach(&self, dispatcher: &mut EventDispatcher, node: NodeId, handles: &SharedHandles);

    /// Delegated subscription: `node` is the container, `filter` selects descendants.
    fn delegate(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
        notifier: Notifier,
        filter: Filter,
    );

    fn detach_delegate(
        &self,
        dispatcher: &mut EventDispatcher,
        node: NodeId,
        handles: &SharedHandles,
    ) {
        self.detach(dispatcher, node, handles);
    }
}

/// Named native subscriptions held on behalf of one synthetic subscription.
#[derive(Debug, Default)]
pub struct SubscriptionHandles {
    handles: Vec<(&'static str, SubscriptionId)>,
}

impl SubscriptionHandles {
    pub fn get(&self, key: &str) -> Option<SubscriptionId> {
        self.handles
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, id)| *id)
    }

    fn set(&mut self, key: &'static str, id: SubscriptionId) -> Option<SubscriptionId> {
        match self.handles.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, id)),
            None => {
                self.handles.push((key, id));
                None
            }
        }
    }

    fn take(&mut self, key: &str) -> Option<SubscriptionId> {
        let index = self.handles.iter().position(|(k, _)| *k == key)?;
        Some(self.handles.swap_remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Shared, interior-mutable [`SubscriptionHandles`].
#[derive(Debug, Clone, Default)]
pub struct SharedHandles(Rc<RefCell<SubscriptionHandles>>);

impl SharedHandles {
    pub fn get(&self, key: &str) -> Option<SubscriptionId> {
        self.0.borrow().get(key)
    }

    /// Store `id` under `key`. A handle previously stored there is detached.
    pub fn set(&self, dispatcher: &mut EventDispatcher, key: &'static str, id: SubscriptionId) {
        let previous = self.0.borrow_mut().set(key, id);
        if let Some(previous) = previous {
            dispatcher.detach(previous);
        }
    }

    /// Detach and forget the handles under `keys`. Missing keys are skipped.
    pub fn release(&self, dispatcher: &mut EventDispatcher, keys: &[&str]) {
        let taken: Vec<_> = {
            let mut handles = self.0.borrow_mut();
            keys.iter().filter_map(|key| handles.take(key)).collect()
        };
        for id in taken {
            dispatcher.detach(id);
        }
    }

    /// Detach and forget every handle.
    pub fn release_all(&self, dispatcher: &mut EventDispatcher) {
        let taken = std::mem::take(&mut self.0.borrow_mut().handles);
        for (_, id) in taken {
            dispatcher.detach(id);
        }
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Delivers a synthetic event to the consumer's callback.
#[derive(Clone)]
pub struct Notifier {
    event_type: Rc<str>,
    callback: Rc<RefCell<Handler>>,
}

impl Notifier {
    pub(crate) fn new(event_type: &str, callback: Handler) -> Self {
        Self {
            event_type: event_type.into(),
            callback: Rc::new(RefCell::new(callback)),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Invoke the callback synchronously. Returns `false` when the callback
    /// is already running further up the stack.
    pub fn fire(&self, dispatcher: &mut EventDispatcher, event: &DomEvent) -> bool {
        match self.callback.try_borrow_mut() {
            Ok(mut callback) => {
                (*callback)(dispatcher, event);
                true
            }
            Err(_) => {
                warn!(event = %self.event_type, "Dropped re-entrant synthetic notification");
                false
            }
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}
