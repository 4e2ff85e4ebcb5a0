//! File system watching for dirwatch
//!
//! This crate provides the event engine behind the `dirwatch` binary:
//! - Watch registration and raw inotify record decoding
//! - Per-file-name debouncing (fixed 100ms window)
//! - Dispatch to handlers registered per event kind
//! - A run loop with a dedicated reader thread and prompt stop

pub mod debounce;
pub mod decode;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod handler;
pub mod platform;
#[cfg(target_os = "linux")]
pub mod registry;

pub use debounce::{DebounceTable, DEBOUNCE_WINDOW};
pub use decode::{decode, EventMask, Record, Records};
pub use dispatch::Dispatcher;
pub use engine::{EventSource, Observed, StopHandle, WatchConfig, Watcher};
pub use error::WatchError;
pub use handler::{EventHandler, HandlerMap};
#[cfg(target_os = "linux")]
pub use registry::WatchRegistry;

use std::ffi::OsString;
use std::fmt;

/// Result type for watcher operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Opaque handle for a registered watch target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub(crate) i32);

impl WatchHandle {
    /// Raw watch descriptor as reported by the kernel
    pub fn as_raw(&self) -> i32 {
        self.0
    }

    /// Wrap a raw watch descriptor
    pub fn from_raw(wd: i32) -> Self {
        Self(wd)
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wd#{}", self.0)
    }
}

/// Type of file system event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// File modified
    Modify,
    /// File created
    Create,
    /// File deleted
    Delete,
}

impl EventKind {
    /// All kinds, in the order handlers are dispatched
    pub const ALL: [EventKind; 3] = [EventKind::Modify, EventKind::Create, EventKind::Delete];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Modify => "MODIFY",
            EventKind::Create => "CREATE",
            EventKind::Delete => "DELETE",
        }
    }

    /// Mask bit carrying this kind
    pub fn mask(&self) -> EventMask {
        match self {
            EventKind::Modify => EventMask::MODIFY,
            EventKind::Create => EventMask::CREATE,
            EventKind::Delete => EventMask::DELETE,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded, named change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Watch that produced the event
    pub handle: WatchHandle,
    /// Raw kind bits
    pub mask: EventMask,
    /// Bare file name, relative to the watched directory
    pub name: OsString,
}

impl RawEvent {
    pub fn new(handle: WatchHandle, mask: EventMask, name: impl Into<OsString>) -> Self {
        Self {
            handle,
            mask,
            name: name.into(),
        }
    }

    /// Kinds set in the mask, in MODIFY, CREATE, DELETE order
    ///
    /// A single record may carry several kind bits; bits outside the
    /// three kinds are not reported.
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| self.mask.contains(kind.mask()))
    }
}
