//! Error types for the imem protocol.
//!
//! This module provides:
//! - `Operation`: Names the protocol operation an error relates to
//! - `ImemError`: The single error type returned by backends and the adapter
//! - Conversions to the host's integer status convention and to `std::io::Error`

use std::fmt;
use std::io;

use libc::{EAGAIN, EBADF, EINTR, EINVAL, EIO, ENOENT, ENOSYS, ETIMEDOUT};
use thiserror::Error;

const fn err_tag(a: u8, b: u8, c: u8, d: u8) -> i32 {
    -((a as i32) | ((b as i32) << 8) | ((c as i32) << 16) | ((d as i32) << 24))
}

/// Status code reported when an operation has no backend callback behind it.
pub const PROTOCOL_NOT_FOUND: i32 = err_tag(0xF8, b'P', b'R', b'O');

/// The protocol operations a backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    Read,
    Write,
    Seek,
    Close,
    /// Native handle lookup
    GetHandle,
    /// Capability probe
    Check,
}

impl Operation {
    /// All seven operations, in callback-table order.
    pub const ALL: [Operation; 7] = [
        Operation::Open,
        Operation::Read,
        Operation::Write,
        Operation::Seek,
        Operation::Close,
        Operation::GetHandle,
        Operation::Check,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Open => write!(f, "open"),
            Operation::Read => write!(f, "read"),
            Operation::Write => write!(f, "write"),
            Operation::Seek => write!(f, "seek"),
            Operation::Close => write!(f, "close"),
            Operation::GetHandle => write!(f, "get_handle"),
            Operation::Check => write!(f, "check"),
        }
    }
}

/// Errors produced by imem backends.
///
/// The protocol adapter never constructs these itself; whatever the active
/// backend returns reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum ImemError {
    /// No callback is installed for the operation.
    #[error("imem backend has no '{op}' callback registered")]
    Unconfigured { op: Operation },

    /// The backend explicitly does not implement the operation.
    #[error("operation '{op}' is not supported by this backend")]
    Unsupported { op: Operation },

    /// No data (or space) is available right now; try again later.
    #[error("resource temporarily unavailable")]
    WouldBlock,

    /// A retried transfer exceeded its deadline.
    #[error("transfer timed out")]
    TimedOut,

    #[error("no such resource: {url}")]
    NotFound { url: String },

    /// The context has no open session.
    #[error("context is not open")]
    NotOpen,

    #[error("invalid seek to offset {offset}")]
    InvalidSeek { offset: i64 },

    /// An option value was rejected.
    #[error("invalid value for option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A raw status code from a backend speaking the host's integer convention.
    #[error("backend status code {0}")]
    Code(i32),
}

impl ImemError {
    /// Map this error to the host's negative status convention.
    pub fn code(&self) -> i32 {
        match self {
            ImemError::Unconfigured { .. } => PROTOCOL_NOT_FOUND,
            ImemError::Unsupported { .. } => -ENOSYS,
            ImemError::WouldBlock => -EAGAIN,
            ImemError::TimedOut => -ETIMEDOUT,
            ImemError::NotFound { .. } => -ENOENT,
            ImemError::NotOpen => -EBADF,
            ImemError::InvalidSeek { .. } | ImemError::InvalidOption { .. } => -EINVAL,
            ImemError::Io(e) => io_error_code(e),
            ImemError::Code(c) => *c,
        }
    }

    /// Build an error from a negative host status code.
    ///
    /// Codes with an obvious counterpart map onto it, everything else is kept
    /// verbatim in `Code`.
    pub fn from_code(code: i32) -> Self {
        match code {
            c if c == -EAGAIN => ImemError::WouldBlock,
            c if c == -ETIMEDOUT => ImemError::TimedOut,
            c if c == -EBADF => ImemError::NotOpen,
            c => ImemError::Code(c),
        }
    }

    /// Whether this is a "try again later" condition.
    pub fn is_would_block(&self) -> bool {
        match self {
            ImemError::WouldBlock => true,
            ImemError::Io(e) => e.kind() == io::ErrorKind::WouldBlock,
            ImemError::Code(c) => *c == -EAGAIN,
            _ => false,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        match self {
            ImemError::Io(e) => e.kind() == io::ErrorKind::Interrupted,
            ImemError::Code(c) => *c == -EINTR,
            _ => false,
        }
    }

    /// Whether the error means no backend callback was installed.
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, ImemError::Unconfigured { .. })
    }
}

fn io_error_code(e: &io::Error) -> i32 {
    // Raw OS numbers are errno values only on unix targets.
    #[cfg(unix)]
    if let Some(errno) = e.raw_os_error() {
        return -errno;
    }
    match e.kind() {
        io::ErrorKind::WouldBlock => -EAGAIN,
        io::ErrorKind::Interrupted => -EINTR,
        io::ErrorKind::NotFound => -ENOENT,
        io::ErrorKind::TimedOut => -ETIMEDOUT,
        io::ErrorKind::InvalidInput => -EINVAL,
        io::ErrorKind::Unsupported => -ENOSYS,
        _ => -EIO,
    }
}

/// Collapse a result into the host convention: the value on success, a
/// negative code on failure.
pub fn status<T>(result: Result<T, ImemError>) -> i64
where
    T: TryInto<i64>,
{
    match result {
        Ok(v) => v.try_into().unwrap_or(i64::MAX),
        Err(e) => i64::from(e.code()),
    }
}

impl From<ImemError> for io::Error {
    fn from(e: ImemError) -> Self {
        match e {
            ImemError::Io(inner) => inner,
            ImemError::WouldBlock => io::Error::from(io::ErrorKind::WouldBlock),
            ImemError::TimedOut => io::Error::new(io::ErrorKind::TimedOut, e),
            ImemError::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, e),
            ImemError::Unconfigured { .. } | ImemError::Unsupported { .. } => {
                io::Error::new(io::ErrorKind::Unsupported, e)
            }
            ImemError::InvalidSeek { .. } | ImemError::InvalidOption { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            ImemError::Code(c) if c == -EAGAIN => io::Error::from(io::ErrorKind::WouldBlock),
            ImemError::Code(c) if c == -EINTR => io::Error::from(io::ErrorKind::Interrupted),
            ImemError::NotOpen | ImemError::Code(_) => io::Error::other(e),
        }
    }
}

#[cfg(feature = "miette")]
mod miette_impl;

#[cfg(feature = "miette")]
pub use miette_impl::*;
