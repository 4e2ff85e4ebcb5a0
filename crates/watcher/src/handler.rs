//! Handler trait and per-kind handler registration.

use crate::EventKind;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;

/// Something that reacts to a dispatched event.
///
/// Handlers run synchronously on the dispatch thread and receive the bare
/// file name. Closures taking `&OsStr` implement this trait.
pub trait EventHandler {
    /// Handler name for logging.
    fn name(&self) -> &str {
        "handler"
    }

    /// Handle one event of `kind` for file `name`.
    fn handle(&mut self, kind: EventKind, name: &OsStr);
}

impl<F> EventHandler for F
where
    F: FnMut(&OsStr),
{
    fn name(&self) -> &str {
        "closure"
    }

    fn handle(&mut self, _kind: EventKind, name: &OsStr) {
        self(name)
    }
}

/// Handlers registered per event kind, kept in registration order.
#[derive(Default)]
pub struct HandlerMap {
    handlers: HashMap<EventKind, Vec<Box<dyn EventHandler>>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn on(mut self, kind: EventKind, handler: impl EventHandler + 'static) -> Self {
        self.register(kind, handler);
        self
    }

    /// Add a handler for `kind`; earlier registrations run first
    pub fn register(&mut self, kind: EventKind, handler: impl EventHandler + 'static) {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Handlers for `kind`, empty if none were registered
    pub fn handlers_for(&mut self, kind: EventKind) -> &mut [Box<dyn EventHandler>] {
        match self.handlers.get_mut(&kind) {
            Some(handlers) => handlers.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Number of handlers registered for `kind`
    pub fn count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            if let Some(handlers) = self.handlers.get(&kind) {
                let names: Vec<&str> = handlers.iter().map(|h| h.name()).collect();
                map.entry(&kind, &names);
            }
        }
        map.finish()
    }
}
