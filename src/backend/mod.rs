//! Backend abstractions behind the imem protocol.
//!
//! This module provides:
//! - `ImemBackend`: The seven-operation interface the adapter forwards to
//! - `CallbackTable`: A backend assembled from individual closures
//! - `CallbackRegistry`: A replaceable slot holding the active backend
//! - `MemoryBackend`: An in-process reference backend

mod callbacks;
mod memory;
mod registry;

pub use callbacks::{
    CallbackTable, CheckFn, CloseFn, GetHandleFn, OpenFn, ReadFn, SeekFn, WriteFn,
};
pub use memory::{MAX_BUFFER_LEN, MemoryBackend};
pub use registry::{CallbackRegistry, global, set_callbacks};

use std::fmt::Debug;

use crate::error::{ImemError, Operation};
use crate::protocol::{Access, OpenFlags, ReadWait, UrlContext, Whence};

/// Storage behind the imem protocol.
///
/// Every method receives the context of the URL being operated on; per-session
/// state lives in the context's private-data slot, not in the backend.
/// Backends are shared by every open context, so they must be `Send + Sync`.
///
/// # Read contract
///
/// If any data is immediately available (even less than `buf.len()`), or end
/// of stream or an error is detected, `read` returns at once. Otherwise:
/// - with `ReadWait::NonBlocking` it returns `ImemError::WouldBlock` at once;
/// - with `ReadWait::Timeout(d)` it waits at most `d` for data, end of stream
///   or an error, and returns `ImemError::WouldBlock` when `d` elapses.
///
/// Looping until `buf` is full, and retrying after `WouldBlock` or an
/// interrupt, is left to the caller (see `ImemStream`).
pub trait ImemBackend: Send + Sync + Debug {
    /// Prepare `ctx` for I/O on `url`.
    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError>;

    /// Read into `buf` honoring `wait`. `Ok(0)` means end of stream.
    fn read(&self, ctx: &mut UrlContext, buf: &mut [u8], wait: ReadWait)
    -> Result<usize, ImemError>;

    /// Write from `buf`, returning how many bytes were accepted.
    fn write(&self, _ctx: &mut UrlContext, _buf: &[u8]) -> Result<usize, ImemError> {
        Err(ImemError::Unsupported {
            op: Operation::Write,
        })
    }

    fn seek(&self, _ctx: &mut UrlContext, _pos: i64, _whence: Whence) -> Result<u64, ImemError> {
        Err(ImemError::Unsupported {
            op: Operation::Seek,
        })
    }

    /// Release whatever `open` set up.
    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError>;

    fn get_handle(&self, _ctx: &mut UrlContext) -> Result<i32, ImemError> {
        Err(ImemError::Unsupported {
            op: Operation::GetHandle,
        })
    }

    fn check(&self, _ctx: &mut UrlContext, _mask: Access) -> Result<Access, ImemError> {
        Err(ImemError::Unsupported {
            op: Operation::Check,
        })
    }
}
