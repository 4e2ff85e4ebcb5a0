//! Thin inotify wrapper
//!
//! Owns the inotify descriptor and exposes the handful of syscalls the
//! registry needs. Decoding of what `read` returns lives in `crate::decode`.

use crate::decode::HEADER_LEN;
use crate::{Result, WatchError, WatchHandle};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::inotify::{self, InitFlags};
use nix::unistd;
use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

/// Mask used for every directory watch
pub const WATCH_MASK: u32 = libc::IN_MODIFY | libc::IN_CREATE | libc::IN_DELETE | libc::IN_ONLYDIR;

/// An open inotify instance; the descriptor closes on drop
#[derive(Debug)]
pub struct Inotify {
    inner: inotify::Inotify,
}

impl Inotify {
    /// Open a new inotify instance
    pub fn init() -> Result<Self> {
        let inner = inotify::Inotify::init(InitFlags::IN_CLOEXEC).map_err(WatchError::init)?;
        Ok(Self { inner })
    }

    /// Start watching `path` with `mask`
    ///
    /// Returns the kernel's watch descriptor as-is so decoded records can be
    /// matched against it.
    pub fn add_watch(&self, path: &Path, mask: u32) -> Result<WatchHandle> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| WatchError::watch(path, io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        // SAFETY: the descriptor is owned by `self` and open, and `c_path` is a
        // NUL-terminated string that outlives the call.
        let wd = Errno::result(unsafe {
            libc::inotify_add_watch(self.as_raw_fd(), c_path.as_ptr(), mask)
        })
        .map_err(|errno| WatchError::watch(path, errno.into()))?;
        Ok(WatchHandle(wd))
    }

    /// Remove a watch
    pub fn rm_watch(&self, handle: WatchHandle) -> nix::Result<()> {
        // nix only removes watches it handed out itself, so the raw
        // descriptor goes straight to the kernel.
        // SAFETY: the descriptor is owned by `self` and open; an unknown
        // watch descriptor is reported as EINVAL, not undefined behavior.
        Errno::result(unsafe { libc::inotify_rm_watch(self.as_raw_fd(), handle.0) }).map(drop)
    }

    /// Wait until the descriptor is readable or `timeout` elapses
    ///
    /// Returns `false` on timeout or when interrupted by a signal.
    pub fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let mut fds = [PollFd::new(&self.inner, PollFlags::POLLIN)];
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        match poll(&mut fds, timeout_ms) {
            Ok(0) | Err(Errno::EINTR) => Ok(false),
            Ok(_) => Ok(true),
            Err(errno) => Err(WatchError::read(errno)),
        }
    }

    /// Read one batch of raw records into `buf`
    ///
    /// Blocks if nothing is queued. A read shorter than one record header
    /// is reported as [`WatchError::ShortRead`].
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let len = unistd::read(self.as_raw_fd(), buf).map_err(WatchError::read)?;

        if len < HEADER_LEN {
            return Err(WatchError::ShortRead {
                len,
                min: HEADER_LEN,
            });
        }
        Ok(len)
    }
}

impl AsRawFd for Inotify {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_fd().as_raw_fd()
    }
}
