//! Per-file-name debouncing logic
//!
//! Editors and build tools tend to emit bursts of events for a single save.
//! The first event for a name is let through; any further event for the same
//! name arriving within [`DEBOUNCE_WINDOW`] of the previous one is dropped.
//! Every event, dropped or not, pushes the name's timestamp forward, so a
//! steady stream of events keeps the name suppressed.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::time::{Duration, Instant};

/// Fixed suppression window
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// Last-seen timestamps keyed by bare file name
///
/// Names are not qualified by their watched directory, so two watched
/// directories sharing a file name also share its suppression state.
#[derive(Debug, Default)]
pub struct DebounceTable {
    last_seen: HashMap<OsString, Instant>,
}

impl DebounceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for `name` observed at `now`
    ///
    /// Returns true if the event should be dispatched, i.e. no event for
    /// `name` was seen within the window before `now`.
    pub fn should_process(&mut self, name: &OsStr, now: Instant) -> bool {
        match self.last_seen.get_mut(name) {
            Some(last) => {
                let quiet = now.saturating_duration_since(*last) >= DEBOUNCE_WINDOW;
                *last = now;
                quiet
            }
            None => {
                self.last_seen.insert(name.to_os_string(), now);
                true
            }
        }
    }

    /// Drop entries last seen more than `horizon` before `now`
    ///
    /// An entry older than the window behaves exactly like a missing one, so
    /// any `horizon >= DEBOUNCE_WINDOW` leaves dispatch decisions unchanged.
    pub fn evict_stale(&mut self, now: Instant, horizon: Duration) -> usize {
        let horizon = horizon.max(DEBOUNCE_WINDOW);
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) < horizon);
        before - self.last_seen.len()
    }

    /// Number of tracked names
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
