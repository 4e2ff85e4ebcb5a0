//! Decoding of raw inotify records
//!
//! A read from an inotify descriptor returns a run of variable-length
//! records laid out as:
//!
//! ```text
//! +--------+--------+--------+--------+----------------------+
//! | wd i32 |mask u32|cookie  | len u32| name (len bytes, NUL |
//! |        |        |   u32  |        | padded)              |
//! +--------+--------+--------+--------+----------------------+
//! ```
//!
//! All header fields are native endian. The next record starts at
//! `HEADER_LEN + len` bytes after the current one.

use crate::{RawEvent, WatchHandle};
use bitflags::bitflags;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// Size of the fixed record header (`struct inotify_event` without name)
pub const HEADER_LEN: usize = 16;

bitflags! {
    /// Event bits reported in a record's mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const ACCESS = 0x0000_0001;
        const MODIFY = 0x0000_0002;
        const ATTRIB = 0x0000_0004;
        const CLOSE_WRITE = 0x0000_0008;
        const CLOSE_NOWRITE = 0x0000_0010;
        const OPEN = 0x0000_0020;
        const MOVED_FROM = 0x0000_0040;
        const MOVED_TO = 0x0000_0080;
        const CREATE = 0x0000_0100;
        const DELETE = 0x0000_0200;
        const DELETE_SELF = 0x0000_0400;
        const MOVE_SELF = 0x0000_0800;
        const UNMOUNT = 0x0000_2000;
        const Q_OVERFLOW = 0x0000_4000;
        const IGNORED = 0x0000_8000;
        const ISDIR = 0x4000_0000;
    }
}

/// One named record, borrowed from the read buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub handle: WatchHandle,
    pub mask: EventMask,
    pub cookie: u32,
    pub name: &'a OsStr,
}

impl Record<'_> {
    /// Copy the record out of the buffer
    pub fn to_event(&self) -> RawEvent {
        RawEvent::new(self.handle, self.mask, self.name)
    }
}

/// Decode a buffer filled by a single read
///
/// The returned iterator is lazy and borrows `buf`; it cannot be restarted.
pub fn decode(buf: &[u8]) -> Records<'_> {
    Records {
        buf,
        offset: 0,
        truncated: false,
    }
}

/// Lazy iterator over the named records of one read
#[derive(Debug)]
pub struct Records<'a> {
    buf: &'a [u8],
    offset: usize,
    truncated: bool,
}

impl<'a> Records<'a> {
    /// True once iteration stopped at a record that overran the buffer
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn stop(&mut self, truncated: bool) {
        self.truncated = truncated;
        self.offset = self.buf.len();
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let remaining = self.buf.len() - self.offset;
            if remaining == 0 {
                return None;
            }
            if remaining < HEADER_LEN {
                self.stop(true);
                return None;
            }

            let header = &self.buf[self.offset..self.offset + HEADER_LEN];
            let wd = read_u32(header, 0) as i32;
            let mask = EventMask::from_bits_retain(read_u32(header, 4));
            let cookie = read_u32(header, 8);
            let len = read_u32(header, 12) as usize;

            let name_start = self.offset + HEADER_LEN;
            let Some(name_end) = name_start.checked_add(len).filter(|end| *end <= self.buf.len())
            else {
                tracing::trace!("record at offset {} overruns the buffer", self.offset);
                self.stop(true);
                return None;
            };
            self.offset = name_end;

            if len == 0 {
                tracing::trace!("skipping unnamed record (wd={}, mask={:?})", wd, mask);
                continue;
            }

            let padded = &self.buf[name_start..name_end];
            let name = match padded.iter().position(|b| *b == 0) {
                Some(nul) => &padded[..nul],
                None => padded,
            };
            if name.is_empty() {
                continue;
            }

            return Some(Record {
                handle: WatchHandle(wd),
                mask,
                cookie,
                name: OsStr::from_bytes(name),
            });
        }
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_ne_bytes(word)
}
