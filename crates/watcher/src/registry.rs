//! Watch registry: the inotify instance plus its registered directories
//!
//! The registry is the only owner of the descriptor and of every watch
//! handle. Dropping it removes all watches and closes the descriptor.

use crate::decode::decode;
use crate::engine::EventSource;
use crate::platform::linux::{Inotify, WATCH_MASK};
use crate::{RawEvent, Result, WatchHandle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default read buffer: room for 1024 records with 16-byte names
pub const DEFAULT_BUFFER_LEN: usize = 1024 * (crate::decode::HEADER_LEN + 16);

/// Registered watch targets keyed by handle
pub struct WatchRegistry {
    inotify: Inotify,
    watches: HashMap<WatchHandle, PathBuf>,
    buffer: Vec<u8>,
}

impl WatchRegistry {
    /// Open the notification channel
    pub fn open() -> Result<Self> {
        let inotify = Inotify::init()?;
        debug!("Opened inotify instance (fd {})", std::os::fd::AsRawFd::as_raw_fd(&inotify));
        Ok(Self {
            inotify,
            watches: HashMap::new(),
            buffer: vec![0u8; DEFAULT_BUFFER_LEN],
        })
    }

    /// Register `path` for modify, create and delete events
    ///
    /// Events for the directory are queued from the moment this returns.
    pub fn watch_directory(&mut self, path: impl AsRef<Path>) -> Result<WatchHandle> {
        let path = path.as_ref();
        let handle = self.inotify.add_watch(path, WATCH_MASK)?;
        debug!("Watching {} as {}", path.display(), handle);
        // Re-adding a path yields the same handle; keep a single entry.
        self.watches.insert(handle, path.to_path_buf());
        Ok(handle)
    }

    /// Path registered under `handle`
    pub fn path_of(&self, handle: WatchHandle) -> Option<&Path> {
        self.watches.get(&handle).map(PathBuf::as_path)
    }

    /// Number of registered watch targets
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Remove every registered watch, returning how many were removed
    pub(crate) fn unwatch_all(&mut self) -> usize {
        let mut removed = 0;
        for (handle, path) in self.watches.drain() {
            match self.inotify.rm_watch(handle) {
                Ok(()) => removed += 1,
                // The kernel drops watches itself when a directory goes away.
                Err(e) => debug!("Failed to remove watch {} for {}: {}", handle, path.display(), e),
            }
        }
        removed
    }

    /// Wait up to `timeout` for data, then read one batch into `buf`
    ///
    /// Returns `Ok(None)` if nothing arrived in time.
    pub fn read_next(&self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>> {
        if !self.inotify.wait_readable(timeout)? {
            return Ok(None);
        }
        self.inotify.read(buf).map(Some)
    }
}

impl EventSource for WatchRegistry {
    fn next_batch(&mut self, timeout: Duration) -> Result<Option<Vec<RawEvent>>> {
        let mut buffer = std::mem::take(&mut self.buffer);
        let read = self.read_next(&mut buffer, timeout);
        let batch = read.map(|len| {
            len.map(|len| {
                let mut records = decode(&buffer[..len]);
                let events: Vec<RawEvent> = records
                    .by_ref()
                    .filter(|record| {
                        let known = self.watches.contains_key(&record.handle);
                        if known {
                            trace!(
                                "{:?} on {} {:?} (cookie {})",
                                record.mask,
                                record.handle,
                                record.name,
                                record.cookie
                            );
                        } else {
                            warn!("Event for unknown watch {} ({:?})", record.handle, record.name);
                        }
                        known
                    })
                    .map(|record| record.to_event())
                    .collect();
                if records.is_truncated() {
                    warn!("Dropped a partial inotify record at the end of a {} byte read", len);
                }
                trace!("Decoded {} events from {} bytes", events.len(), len);
                events
            })
        });
        self.buffer = buffer;
        batch
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        let removed = self.unwatch_all();
        debug!("Closed inotify instance after removing {} watches", removed);
    }
}
