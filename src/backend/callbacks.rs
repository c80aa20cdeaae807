//! Backends assembled from individual callbacks.
//!
//! A `CallbackTable` lets an embedding application supply only the closures it
//! cares about. Any slot left empty answers with `ImemError::Unconfigured`.

use std::fmt;
use std::sync::Arc;

use super::ImemBackend;
use crate::error::{ImemError, Operation};
use crate::protocol::{Access, OpenFlags, ReadWait, UrlContext, Whence};

pub type OpenFn =
    Arc<dyn Fn(&mut UrlContext, &str, OpenFlags) -> Result<(), ImemError> + Send + Sync>;

/// Read callback; must honor the read contract documented on `ImemBackend`.
pub type ReadFn =
    Arc<dyn Fn(&mut UrlContext, &mut [u8], ReadWait) -> Result<usize, ImemError> + Send + Sync>;

pub type WriteFn = Arc<dyn Fn(&mut UrlContext, &[u8]) -> Result<usize, ImemError> + Send + Sync>;

pub type SeekFn =
    Arc<dyn Fn(&mut UrlContext, i64, Whence) -> Result<u64, ImemError> + Send + Sync>;

pub type CloseFn = Arc<dyn Fn(&mut UrlContext) -> Result<(), ImemError> + Send + Sync>;

pub type GetHandleFn = Arc<dyn Fn(&mut UrlContext) -> Result<i32, ImemError> + Send + Sync>;

pub type CheckFn =
    Arc<dyn Fn(&mut UrlContext, Access) -> Result<Access, ImemError> + Send + Sync>;

/// The seven operation callbacks of an imem backend.
///
/// # Example
///
/// ```rust,ignore
/// use imem::{CallbackTable, ImemError};
///
/// let table = CallbackTable::new()
///     .with_open(|_ctx, _url, _flags| Ok(()))
///     .with_read(|_ctx, _buf, _wait| Err(ImemError::WouldBlock))
///     .with_close(|_ctx| Ok(()));
///
/// imem::set_callbacks(table);
/// ```
#[derive(Clone, Default)]
pub struct CallbackTable {
    pub open: Option<OpenFn>,
    pub read: Option<ReadFn>,
    pub write: Option<WriteFn>,
    pub seek: Option<SeekFn>,
    pub close: Option<CloseFn>,
    pub get_handle: Option<GetHandleFn>,
    pub check: Option<CheckFn>,
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTable")
            .field("has_open", &self.open.is_some())
            .field("has_read", &self.read.is_some())
            .field("has_write", &self.write.is_some())
            .field("has_seek", &self.seek.is_some())
            .field("has_close", &self.close.is_some())
            .field("has_get_handle", &self.get_handle.is_some())
            .field("has_check", &self.check.is_some())
            .finish()
    }
}

impl CallbackTable {
    /// Create a table with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext, &str, OpenFlags) -> Result<(), ImemError> + Send + Sync + 'static,
    {
        self.open = Some(Arc::new(f));
        self
    }

    pub fn with_read<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext, &mut [u8], ReadWait) -> Result<usize, ImemError>
            + Send
            + Sync
            + 'static,
    {
        self.read = Some(Arc::new(f));
        self
    }

    pub fn with_write<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext, &[u8]) -> Result<usize, ImemError> + Send + Sync + 'static,
    {
        self.write = Some(Arc::new(f));
        self
    }

    pub fn with_seek<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext, i64, Whence) -> Result<u64, ImemError> + Send + Sync + 'static,
    {
        self.seek = Some(Arc::new(f));
        self
    }

    pub fn with_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext) -> Result<(), ImemError> + Send + Sync + 'static,
    {
        self.close = Some(Arc::new(f));
        self
    }

    pub fn with_get_handle<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext) -> Result<i32, ImemError> + Send + Sync + 'static,
    {
        self.get_handle = Some(Arc::new(f));
        self
    }

    pub fn with_check<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UrlContext, Access) -> Result<Access, ImemError> + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(f));
        self
    }

    /// Forward every slot to `backend`.
    pub fn from_backend(backend: Arc<dyn ImemBackend>) -> Self {
        let (b1, b2, b3, b4, b5, b6, b7) = (
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
        );
        Self::new()
            .with_open(move |ctx, url, flags| b1.open(ctx, url, flags))
            .with_read(move |ctx, buf, wait| b2.read(ctx, buf, wait))
            .with_write(move |ctx, buf| b3.write(ctx, buf))
            .with_seek(move |ctx, pos, whence| b4.seek(ctx, pos, whence))
            .with_close(move |ctx| b5.close(ctx))
            .with_get_handle(move |ctx| b6.get_handle(ctx))
            .with_check(move |ctx, mask| b7.check(ctx, mask))
    }

    /// Whether the slot for `op` is populated.
    pub fn has(&self, op: Operation) -> bool {
        match op {
            Operation::Open => self.open.is_some(),
            Operation::Read => self.read.is_some(),
            Operation::Write => self.write.is_some(),
            Operation::Seek => self.seek.is_some(),
            Operation::Close => self.close.is_some(),
            Operation::GetHandle => self.get_handle.is_some(),
            Operation::Check => self.check.is_some(),
        }
    }

    /// Operations with no callback installed.
    pub fn missing(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.has(*op))
            .collect()
    }
}

fn unconfigured(op: Operation) -> ImemError {
    ImemError::Unconfigured { op }
}

impl ImemBackend for CallbackTable {
    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError> {
        let f = self.open.as_ref().ok_or_else(|| unconfigured(Operation::Open))?;
        f(ctx, url, flags)
    }

    fn read(
        &self,
        ctx: &mut UrlContext,
        buf: &mut [u8],
        wait: ReadWait,
    ) -> Result<usize, ImemError> {
        let f = self.read.as_ref().ok_or_else(|| unconfigured(Operation::Read))?;
        f(ctx, buf, wait)
    }

    fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError> {
        let f = self
            .write
            .as_ref()
            .ok_or_else(|| unconfigured(Operation::Write))?;
        f(ctx, buf)
    }

    fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        let f = self.seek.as_ref().ok_or_else(|| unconfigured(Operation::Seek))?;
        f(ctx, pos, whence)
    }

    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError> {
        let f = self
            .close
            .as_ref()
            .ok_or_else(|| unconfigured(Operation::Close))?;
        f(ctx)
    }

    fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError> {
        let f = self
            .get_handle
            .as_ref()
            .ok_or_else(|| unconfigured(Operation::GetHandle))?;
        f(ctx)
    }

    fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError> {
        let f = self
            .check
            .as_ref()
            .ok_or_else(|| unconfigured(Operation::Check))?;
        f(ctx, mask)
    }
}
