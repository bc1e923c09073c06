//! Single-threaded event dispatcher: subscribe, once, delegate, detach, dispatch.
//!
//! Events bubble from the target to the root. Handlers receive the
//! dispatcher mutably, so they can subscribe or detach while an event is
//! being delivered:
//! - a subscription added during dispatch does not see that same event;
//! - a subscription detached during dispatch is skipped;
//! - a once-only subscription is detached before its handler runs.

use crate::synthetic::{Notifier, SharedHandles, SyntheticEvent};
use crate::{DomEvent, Filter, NodeId, NodeTree};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

/// Event handler. Receives the dispatcher and the event being delivered.
pub type Handler = Box<dyn FnMut(&mut EventDispatcher, &DomEvent)>;

/// Opaque subscription handle. Detaching a stale handle does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    index: u32,
    generation: u32,
}

struct Listener {
    node: NodeId,
    event_type: String,
    delegate: Option<Filter>,
    once: bool,
    /// Registration order.
    seq: u64,
    /// Taken out while the handler runs.
    handler: Option<Handler>,
}

struct SyntheticBinding {
    definition: Rc<dyn SyntheticEvent>,
    node: NodeId,
    handles: SharedHandles,
    delegated: bool,
}

enum Entry {
    Listener(Listener),
    Synthetic(SyntheticBinding),
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

pub struct EventDispatcher {
    tree: NodeTree,
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_seq: u64,
    definitions: HashMap<String, Rc<dyn SyntheticEvent>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::with_tree(NodeTree::new())
    }

    pub fn with_tree(tree: NodeTree) -> Self {
        Self {
            tree,
            slots: Vec::new(),
            free: Vec::new(),
            next_seq: 0,
            definitions: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Register a synthetic event under `name`, replacing any previous definition.
    pub fn define(&mut self, name: &str, definition: Rc<dyn SyntheticEvent>) {
        if self.definitions.insert(name.to_string(), definition).is_some() {
            warn!(event = name, "Synthetic event redefined");
        } else {
            info!(event = name, "Synthetic event defined");
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Subscribe `handler` to `event_type` events reaching `node`.
    pub fn subscribe(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: impl FnMut(&mut EventDispatcher, &DomEvent) + 'static,
    ) -> SubscriptionId {
        match self.definitions.get(event_type).cloned() {
            Some(definition) => {
                self.bind_synthetic(definition, node, event_type, Box::new(handler), None)
            }
            None => self.add_listener(node, event_type, None, false, Box::new(handler)),
        }
    }

    /// Subscribe for the first matching event only.
    pub fn once(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: impl FnOnce(&mut EventDispatcher, &DomEvent) + 'static,
    ) -> SubscriptionId {
        let mut handler = Some(handler);
        if !self.definitions.contains_key(event_type) {
            return self.add_listener(
                node,
                event_type,
                None,
                true,
                Box::new(move |d, e| {
                    if let Some(handler) = handler.take() {
                        handler(d, e);
                    }
                }),
            );
        }

        // Synthetic subscriptions have no once flag; the handler detaches itself.
        let own: Rc<Cell<Option<SubscriptionId>>> = Rc::default();
        let slot = own.clone();
        let id = self.subscribe(node, event_type, move |d, e| {
            if let Some(id) = slot.take() {
                d.detach(id);
            }
            if let Some(handler) = handler.take() {
                handler(d, e);
            }
        });
        own.set(Some(id));
        id
    }

    /// Subscribe on container `node` for events whose target, or an
    /// ancestor of it below `node`, matches `filter`. The match is passed
    /// as `current_target`.
    pub fn delegate(
        &mut self,
        node: NodeId,
        event_type: &str,
        filter: impl Into<Filter>,
        handler: impl FnMut(&mut EventDispatcher, &DomEvent) + 'static,
    ) -> SubscriptionId {
        let filter = filter.into();
        match self.definitions.get(event_type).cloned() {
            Some(definition) => {
                self.bind_synthetic(definition, node, event_type, Box::new(handler), Some(filter))
            }
            None => self.add_listener(node, event_type, Some(filter), false, Box::new(handler)),
        }
    }

    /// Release a subscription. Returns `false` when it was already released.
    pub fn detach(&mut self, id: SubscriptionId) -> bool {
        let Some(entry) = self.release(id) else {
            return false;
        };

        match entry {
            Entry::Listener(listener) => {
                trace!(event = %listener.event_type, ?id, "Listener detached");
            }
            Entry::Synthetic(binding) => {
                debug!(node = ?binding.node, ?id, "Synthetic subscription detached");
                if binding.delegated {
                    binding
                        .definition
                        .detach_delegate(self, binding.node, &binding.handles);
                } else {
                    binding.definition.detach(self, binding.node, &binding.handles);
                }
            }
        }
        true
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of live subscriptions, native and synthetic.
    pub fn live_subscriptions(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    /// Number of live native listeners for `event_type` bound on `node`.
    pub fn live_subscriptions_for(&self, node: NodeId, event_type: &str) -> usize {
        self.slots
            .iter()
            .filter(|slot| match &slot.entry {
                Some(Entry::Listener(l)) => l.node == node && l.event_type == event_type,
                _ => false,
            })
            .count()
    }

    /// Deliver `event` at `target`, bubbling to the root. Returns the number
    /// of handlers invoked.
    pub fn dispatch(&mut self, target: NodeId, mut event: DomEvent) -> usize {
        if !self.tree.contains(target) {
            warn!(?target, event = %event.event_type, "Dispatch to unknown node ignored");
            return 0;
        }

        event.target = Some(target);
        let limit = self.next_seq;
        let path: Vec<NodeId> = self.tree.ancestors(target).collect();
        let mut delivered = 0;

        for (depth, &node) in path.iter().enumerate() {
            let mut matched: Vec<(u64, SubscriptionId, NodeId)> = Vec::new();
            for (index, slot) in self.slots.iter().enumerate() {
                let Some(Entry::Listener(listener)) = &slot.entry else {
                    continue;
                };
                if listener.node != node
                    || listener.seq >= limit
                    || listener.event_type != event.event_type
                {
                    continue;
                }
                let current = match &listener.delegate {
                    None => Some(node),
                    Some(filter) => path[..depth]
                        .iter()
                        .copied()
                        .find(|&candidate| filter.matches(&self.tree, candidate)),
                };
                if let Some(current) = current {
                    let id = SubscriptionId {
                        index: index as u32,
                        generation: slot.generation,
                    };
                    matched.push((listener.seq, id, current));
                }
            }
            matched.sort_by_key(|(seq, _, _)| *seq);

            for (_, id, current) in matched {
                if self.invoke(id, current, &mut event) {
                    delivered += 1;
                }
            }
        }

        trace!(event = %event.event_type, ?target, delivered, "Dispatched");
        delivered
    }

    fn invoke(&mut self, id: SubscriptionId, current: NodeId, event: &mut DomEvent) -> bool {
        let Some(Entry::Listener(listener)) = self.entry_mut(id) else {
            return false;
        };
        // Already running further up the stack.
        let Some(mut handler) = listener.handler.take() else {
            return false;
        };
        let once = listener.once;
        if once {
            self.release(id);
        }

        event.current_target = Some(current);
        handler(self, &*event);

        if !once {
            if let Some(Entry::Listener(listener)) = self.entry_mut(id) {
                listener.handler = Some(handler);
            }
        }
        true
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        delegate: Option<Filter>,
        once: bool,
        handler: Handler,
    ) -> SubscriptionId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.insert(Entry::Listener(Listener {
            node,
            event_type: event_type.to_string(),
            delegate,
            once,
            seq,
            handler: Some(handler),
        }));
        trace!(event = event_type, ?node, ?id, once, "Listener attached");
        id
    }

    fn bind_synthetic(
        &mut self,
        definition: Rc<dyn SyntheticEvent>,
        node: NodeId,
        event_type: &str,
        callback: Handler,
        filter: Option<Filter>,
    ) -> SubscriptionId {
        let handles = SharedHandles::default();
        let notifier = Notifier::new(event_type, callback);
        let id = self.insert(Entry::Synthetic(SyntheticBinding {
            definition: definition.clone(),
            node,
            handles: handles.clone(),
            delegated: filter.is_some(),
        }));

        match filter {
            None => definition.on(self, node, &handles, notifier),
            Some(filter) => definition.delegate(self, node, &handles, notifier, filter),
        }
        debug!(event = event_type, ?node, ?id, "Synthetic subscription attached");
        id
    }

    fn insert(&mut self, entry: Entry) -> SubscriptionId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                SubscriptionId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                SubscriptionId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: SubscriptionId) -> Option<Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(entry)
    }

    fn entry(&self, id: SubscriptionId) -> Option<&Entry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: SubscriptionId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Selector};
    use std::cell::RefCell;

    fn tree() -> (EventDispatcher, NodeId, NodeId, NodeId) {
        let mut d = EventDispatcher::new();
        let root = d.tree_mut().create_element("ul");
        let item = d.tree_mut().create_element("li");
        let label = d.tree_mut().create_element("span");
        d.tree_mut().add_class(item, "item").unwrap();
        d.tree_mut().append_child(root, item).unwrap();
        d.tree_mut().append_child(item, label).unwrap();
        (d, root, item, label)
    }

    fn click() -> DomEvent {
        DomEvent::mouse("click", Point::new(1.0, 1.0), None)
    }

    #[test]
    fn test_bubbles_in_order() {
        let (mut d, root, item, label) = tree();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (node, name) in [(root, "root"), (label, "label"), (item, "item")] {
            let log = log.clone();
            d.subscribe(node, "click", move |_, e| {
                log.borrow_mut().push((name, e.current_target));
            });
        }

        assert_eq!(d.dispatch(label, click()), 3);
        assert_eq!(
            *log.borrow(),
            vec![
                ("label", Some(label)),
                ("item", Some(item)),
                ("root", Some(root))
            ]
        );
    }

    #[test]
    fn test_once_fires_once() {
        let (mut d, root, _, _) = tree();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = d.once(root, "click", move |_, _| c.set(c.get() + 1));

        d.dispatch(root, click());
        d.dispatch(root, click());
        assert_eq!(count.get(), 1);
        assert!(!d.is_live(id));
        assert_eq!(d.live_subscriptions(), 0);
    }

    #[test]
    fn test_detach_is_idempotent_and_stale_ids_are_inert() {
        let (mut d, root, _, _) = tree();
        let first = d.subscribe(root, "click", |_, _| {});
        assert!(d.detach(first));
        assert!(!d.detach(first));

        // reuses the slot with a new generation
        let second = d.subscribe(root, "click", |_, _| {});
        assert!(!d.detach(first));
        assert!(d.is_live(second));
        assert_eq!(d.live_subscriptions(), 1);
    }

    #[test]
    fn test_delegate_reports_match() {
        let (mut d, root, item, label) = tree();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        d.delegate(
            root,
            "click",
            Selector::parse("li.item").unwrap(),
            move |_, e| s.set(e.current_target),
        );

        d.dispatch(label, click());
        assert_eq!(seen.get(), Some(item));

        // the container itself never matches
        seen.set(None);
        d.dispatch(root, click());
        assert_eq!(seen.get(), None);
    }

    #[test]
    fn test_subscription_added_during_dispatch_misses_current_event() {
        let (mut d, root, _, label) = tree();
        let late = Rc::new(Cell::new(0));
        let l = late.clone();
        d.once(label, "click", move |d, _| {
            let l = l.clone();
            d.subscribe(root, "click", move |_, _| l.set(l.get() + 1));
        });

        d.dispatch(label, click());
        assert_eq!(late.get(), 0);
        d.dispatch(label, click());
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn test_detach_during_dispatch_skips_listener() {
        let (mut d, root, item, _) = tree();
        let hit = Rc::new(Cell::new(false));
        let h = hit.clone();
        let victim = d.subscribe(root, "click", move |_, _| h.set(true));
        d.subscribe(item, "click", move |d, _| {
            d.detach(victim);
        });

        d.dispatch(item, click());
        assert!(!hit.get());
    }

    #[test]
    fn test_dispatch_to_unknown_node_is_ignored() {
        let (mut d, _, _, _) = tree();
        let mut other = NodeTree::new();
        for _ in 0..10 {
            other.create_element("div");
        }
        let stranger = other.create_element("div");
        assert_eq!(d.dispatch(stranger, click()), 0);
    }
}
