//! Debounce and dispatch of decoded events

use crate::debounce::DebounceTable;
use crate::handler::HandlerMap;
use crate::{EventKind, RawEvent};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Routes decoded events to handlers, suppressing bursts per file name
#[derive(Debug)]
pub struct Dispatcher {
    debounce: DebounceTable,
    handlers: HandlerMap,
}

impl Dispatcher {
    pub fn new(handlers: HandlerMap) -> Self {
        for kind in EventKind::ALL {
            let count = handlers.count(kind);
            if count > 0 {
                debug!("{} handler(s) registered for {}", count, kind);
            }
        }
        Self {
            debounce: DebounceTable::new(),
            handlers,
        }
    }

    /// Process one event observed at `at`
    ///
    /// Each kind bit in the mask is checked independently (MODIFY, then
    /// CREATE, then DELETE) and every handler registered for a matching kind
    /// runs to completion before this returns. Returns the number of handler
    /// invocations.
    pub fn process(&mut self, event: &RawEvent, at: Instant) -> usize {
        if !self.debounce.should_process(&event.name, at) {
            trace!("Debounced {:?} ({:?})", event.name, event.mask);
            return 0;
        }

        let mut invoked = 0;
        for kind in event.kinds() {
            for handler in self.handlers.handlers_for(kind) {
                debug!("{} {:?} -> {}", kind, event.name, handler.name());
                handler.handle(kind, &event.name);
                invoked += 1;
            }
        }
        invoked
    }

    /// Forget names not seen for `horizon`
    pub fn evict_stale(&mut self, now: Instant, horizon: Duration) -> usize {
        let evicted = self.debounce.evict_stale(now, horizon);
        if evicted > 0 {
            trace!("Evicted {} stale debounce entries", evicted);
        }
        evicted
    }

    pub fn debounce(&self) -> &DebounceTable {
        &self.debounce
    }
}
