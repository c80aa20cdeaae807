//! Replaceable backend slot.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::{CallbackTable, ImemBackend};
use crate::error::ImemError;
use crate::protocol::{Access, OpenFlags, ReadWait, UrlContext, Whence};

/// A shared slot holding the active imem backend.
///
/// Clones share the same slot. Registration replaces the whole backend; there
/// is no merging with what was installed before. Each operation takes a
/// snapshot of the slot and releases the lock before calling into the backend,
/// so a replacement never tears an in-flight call: that call completes on the
/// old backend and later calls see the new one.
#[derive(Debug, Clone)]
pub struct CallbackRegistry {
    slot: Arc<RwLock<Arc<dyn ImemBackend>>>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    /// Create a registry whose table is entirely empty.
    pub fn new() -> Self {
        Self::with_backend(Arc::new(CallbackTable::new()))
    }

    /// Create a registry that starts out with `backend` installed.
    pub fn with_backend(backend: Arc<dyn ImemBackend>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(backend)),
        }
    }

    /// Install `table`, replacing the previous one in its entirety.
    pub fn register(&self, table: CallbackTable) {
        let missing = table.missing();
        if !missing.is_empty() {
            debug!(?missing, "registering imem callback table with empty slots");
        }
        self.register_backend(Arc::new(table));
    }

    /// Install an arbitrary backend, replacing the previous one.
    pub fn register_backend(&self, backend: Arc<dyn ImemBackend>) {
        debug!(?backend, "imem backend registered");
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = backend;
    }

    /// Snapshot of the backend currently installed.
    pub fn current(&self) -> Arc<dyn ImemBackend> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ImemBackend for CallbackRegistry {
    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError> {
        self.current().open(ctx, url, flags)
    }

    fn read(
        &self,
        ctx: &mut UrlContext,
        buf: &mut [u8],
        wait: ReadWait,
    ) -> Result<usize, ImemError> {
        self.current().read(ctx, buf, wait)
    }

    fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError> {
        self.current().write(ctx, buf)
    }

    fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        self.current().seek(ctx, pos, whence)
    }

    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError> {
        self.current().close(ctx)
    }

    fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError> {
        self.current().get_handle(ctx)
    }

    fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError> {
        self.current().check(ctx, mask)
    }
}

static GLOBAL: OnceLock<CallbackRegistry> = OnceLock::new();

/// The process-wide registry used by `ImemProtocol::global`.
///
/// Starts out empty: every operation reports `Unconfigured` until
/// `set_callbacks` is called.
pub fn global() -> &'static CallbackRegistry {
    GLOBAL.get_or_init(CallbackRegistry::new)
}

/// Install `table` as the process-wide imem backend.
pub fn set_callbacks(table: CallbackTable) {
    global().register(table);
}
