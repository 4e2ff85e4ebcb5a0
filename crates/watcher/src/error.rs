//! Error types for the watcher.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// None of these are retried; callers decide whether to exit.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize inotify")]
    InitFailed {
        #[source]
        source: io::Error,
    },

    #[error("Cannot watch directory {}", .path.display())]
    WatchFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read inotify events")]
    ReadFailed {
        #[source]
        source: io::Error,
    },

    #[error("Short read from inotify: got {len} bytes, need at least {min}")]
    ShortRead { len: usize, min: usize },

    #[error("Failed to spawn reader thread")]
    SpawnFailed {
        #[source]
        source: io::Error,
    },

    #[error("Reader thread panicked")]
    ReaderPanicked,
}

impl WatchError {
    pub(crate) fn init(errno: nix::errno::Errno) -> Self {
        WatchError::InitFailed {
            source: errno.into(),
        }
    }

    pub(crate) fn watch(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WatchError::WatchFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read(errno: nix::errno::Errno) -> Self {
        WatchError::ReadFailed {
            source: errno.into(),
        }
    }
}
