//! Publish/subscribe channel announcing committed mutations.
//!
//! Any number of handlers may subscribe to an [`EventName`]. `subscribe`
//! returns a [`Subscription`] handle and `unsubscribe` removes exactly that
//! handler. Publishing is synchronous: every current handler for the event's
//! name runs, in subscription order, before `publish` returns.
//!
//! ```rust
//! use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};
//! use cairn_core::events::{Event, EventName, Notifier};
//!
//! let notifier = Notifier::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! let handle = notifier.subscribe(EventName::DocumentDeleted, move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! notifier.publish(&Event::DocumentDeleted { id: "p1".into() });
//! assert!(notifier.unsubscribe(&handle));
//! notifier.publish(&Event::DocumentDeleted { id: "p2".into() });
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{error::CairnError, models::Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    DocumentCreated,
    DocumentUpdated,
    DocumentDeleted,
    DocumentsBulkLoaded,
    Error,
}

impl EventName {
    pub const ALL: [EventName; 5] = [
        EventName::DocumentCreated,
        EventName::DocumentUpdated,
        EventName::DocumentDeleted,
        EventName::DocumentsBulkLoaded,
        EventName::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::DocumentCreated => "document-created",
            EventName::DocumentUpdated => "document-updated",
            EventName::DocumentDeleted => "document-deleted",
            EventName::DocumentsBulkLoaded => "documents-bulk-loaded",
            EventName::Error => "error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an error announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    /// Operation that failed, e.g. `update_plan`
    pub operation: String,
    /// [`CairnError::kind`] of the failure
    pub kind: &'static str,
    pub message: String,
}

impl ErrorEvent {
    pub fn from_error(operation: &str, error: &CairnError) -> Self {
        Self {
            operation: operation.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DocumentCreated(Plan),
    DocumentUpdated(Plan),
    DocumentDeleted { id: String },
    DocumentsBulkLoaded(Vec<Plan>),
    Error(ErrorEvent),
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Event::DocumentCreated(_) => EventName::DocumentCreated,
            Event::DocumentUpdated(_) => EventName::DocumentUpdated,
            Event::DocumentDeleted { .. } => EventName::DocumentDeleted,
            Event::DocumentsBulkLoaded(_) => EventName::DocumentsBulkLoaded,
            Event::Error(_) => EventName::Error,
        }
    }
}

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Opaque handle identifying one registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    name: EventName,
    id: u64,
}

impl Subscription {
    pub fn name(&self) -> EventName {
        self.name
    }
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<EventName, Vec<(u64, Handler)>>>,
}

/// Cheaply cloneable; clones share one registry.
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Arc<Registry>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, name: EventName, handler: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .handlers
            .write()
            .entry(name)
            .or_default()
            .push((id, Arc::new(handler)));
        Subscription { name, id }
    }

    /// Removes the handler behind `subscription`. Returns whether it was
    /// still registered.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut handlers = self.registry.handlers.write();
        let Some(list) = handlers.get_mut(&subscription.name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != subscription.id);
        before != list.len()
    }

    /// Drops every handler for `name`; returns how many were removed.
    pub fn unsubscribe_all(&self, name: EventName) -> usize {
        self.registry
            .handlers
            .write()
            .remove(&name)
            .map_or(0, |list| list.len())
    }

    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.registry
            .handlers
            .read()
            .get(&name)
            .map_or(0, Vec::len)
    }

    /// Invokes every handler registered for the event's name.
    pub fn publish(&self, event: &Event) {
        // Handlers may subscribe or unsubscribe while running.
        let handlers: Vec<Handler> = self
            .registry
            .handlers
            .read()
            .get(&event.name())
            .map(|list| list.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default();

        for handler in handlers {
            handler(event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.registry.handlers.read();
        let counts: HashMap<&str, usize> = handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("Notifier").field("handlers", &counts).finish()
    }
}
