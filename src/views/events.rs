//! Map interaction events and the subscription interface views use to receive them.
//!
//! Handlers are registered on an [`EventBus`] and stay registered for as long
//! as the returned [`Subscription`] lives. Views keep their subscriptions as
//! fields, so dropping a view deregisters every handler that refers to it.

use crate::types::geo::LngLat;
use log::debug;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The map style finished loading.
    Load,
    Click(LngLat),
    /// A shape was drawn; carries the draw control's GeoJSON features.
    DrawCreate(Vec<Value>),
    /// A drawn shape was edited.
    DrawUpdate(Vec<Value>),
    DrawDelete,
    MouseEnter { layer: String, position: LngLat },
    MouseLeave { layer: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    Click,
    DrawCreate,
    DrawUpdate,
    DrawDelete,
    MouseEnter,
    MouseLeave,
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::Load => EventKind::Load,
            MapEvent::Click(_) => EventKind::Click,
            MapEvent::DrawCreate(_) => EventKind::DrawCreate,
            MapEvent::DrawUpdate(_) => EventKind::DrawUpdate,
            MapEvent::DrawDelete => EventKind::DrawDelete,
            MapEvent::MouseEnter { .. } => EventKind::MouseEnter,
            MapEvent::MouseLeave { .. } => EventKind::MouseLeave,
        }
    }
}

type Handler = Rc<RefCell<dyn FnMut(&MapEvent)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, EventKind, Handler)>,
}

/// Dispatches map events to subscribed handlers. Cheap to clone; clones share
/// the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl FnMut(&MapEvent) + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .push((id, kind, Rc::new(RefCell::new(handler))));
        debug!("Subscribed handler {} to {:?}", id, kind);
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Calls every handler subscribed to the event's kind, in subscription
    /// order, and returns how many ran.
    ///
    /// Handlers may subscribe or unsubscribe while being called; changes take
    /// effect from the next event. A handler that re-enters `emit` for itself
    /// is skipped on the nested call.
    pub fn emit(&self, event: &MapEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();

        let mut called = 0;
        for handler in targets {
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event);
                called += 1;
            }
        }
        called
    }

    pub fn handler_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

/// Keeps a handler registered; dropping it deregisters the handler.
#[must_use = "dropping a Subscription immediately deregisters its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.handlers.retain(|(id, _, _)| *id != self.id);
                debug!("Deregistered handler {}", self.id);
            }
        }
    }
}
