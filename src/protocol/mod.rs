//! Host-facing protocol interface.
//!
//! This module provides:
//! - `UrlProtocol`: The interface a host framework drives for a URL scheme
//! - `UrlContext`: Per-opened-URL state handed to every operation
//! - `OpenFlags`, `Whence`, `Access`: Operation arguments

mod context;

pub use context::{DEFAULT_READ_TIMEOUT, ReadWait, UrlContext};

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::config::OptionDescriptor;
use crate::error::ImemError;

/// Flags a URL is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the resource if it doesn't exist.
    pub create: bool,
    /// Reads must not wait for data.
    pub nonblock: bool,
}

impl OpenFlags {
    /// Flags for reading an existing resource.
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    /// Flags for creating or overwriting a resource.
    pub fn write_only() -> Self {
        Self {
            write: true,
            create: true,
            ..Self::default()
        }
    }

    /// Flags for reading and writing, creating the resource if needed.
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            create: true,
            ..Self::default()
        }
    }

    /// Return the same flags in non-blocking mode.
    pub fn nonblocking(mut self) -> Self {
        self.nonblock = true;
        self
    }
}

/// Reference point for a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute position from the start.
    Start,
    /// Relative to the current position.
    Current,
    /// Relative to the end.
    End,
    /// Do not move; report the total size instead.
    Size,
}

impl fmt::Display for Whence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Whence::Start => write!(f, "start"),
            Whence::Current => write!(f, "current"),
            Whence::End => write!(f, "end"),
            Whence::Size => write!(f, "size"),
        }
    }
}

/// Capability bitmask used by `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Access(u32);

impl Access {
    pub const NONE: Access = Access(0);
    pub const READ: Access = Access(1);
    pub const WRITE: Access = Access(2);
    pub const EXISTS: Access = Access(4);
    pub const ALL: Access = Access(1 | 2 | 4);

    /// Build a mask from raw bits, dropping unknown ones.
    pub fn from_bits_truncate(bits: u32) -> Self {
        Access(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl BitOrAssign for Access {
    fn bitor_assign(&mut self, rhs: Access) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Access {
    type Output = Access;

    fn bitand(self, rhs: Access) -> Access {
        Access(self.0 & rhs.0)
    }
}

/// The interface a host framework drives for one URL scheme.
///
/// The host allocates a `UrlContext` per URL, then calls `open`, any number of
/// transfers, and finally `close`.
pub trait UrlProtocol: Send + Sync {
    /// Scheme name the host routes to this protocol.
    fn name(&self) -> &'static str;

    /// Options recognised on each opened instance.
    fn options(&self) -> &'static [OptionDescriptor];

    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError>;

    /// Read into `buf`; `Ok(0)` means end of stream.
    fn read(&self, ctx: &mut UrlContext, buf: &mut [u8]) -> Result<usize, ImemError>;

    fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError>;

    /// Move the position and return the new absolute offset (or the size for
    /// `Whence::Size`).
    fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError>;

    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError>;

    /// Underlying native handle, if the backend has one.
    fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError>;

    /// Report which of the requested capabilities are satisfied.
    fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError>;
}
