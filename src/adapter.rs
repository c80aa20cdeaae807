//! The imem protocol adapter.
//!
//! `ImemProtocol` satisfies the host's `UrlProtocol` interface by handing every
//! call to its backend with the same arguments and returning the backend's
//! result untouched. It validates nothing, buffers nothing, never retries and
//! never translates errors.

use std::sync::Arc;

use tracing::trace;

use crate::backend::{CallbackRegistry, ImemBackend, global};
use crate::error::ImemError;
use crate::protocol::{Access, UrlContext};
#[cfg(feature = "protocol")]
use crate::protocol::{OpenFlags, UrlProtocol, Whence};

/// Scheme name the host routes to this protocol.
pub const SCHEME: &str = "imem";

/// Protocol adapter forwarding to an injected backend.
#[derive(Debug, Clone)]
pub struct ImemProtocol {
    backend: Arc<dyn ImemBackend>,
}

impl ImemProtocol {
    /// Create an adapter over `backend`.
    pub fn new(backend: Arc<dyn ImemBackend>) -> Self {
        Self { backend }
    }

    /// Create an adapter that dispatches through `registry`, picking up
    /// whatever table is registered at call time.
    pub fn from_registry(registry: &CallbackRegistry) -> Self {
        Self::new(Arc::new(registry.clone()))
    }

    /// Create an adapter over the process-wide registry.
    pub fn global() -> Self {
        Self::from_registry(global())
    }

    pub fn read(&self, ctx: &mut UrlContext, buf: &mut [u8]) -> Result<usize, ImemError> {
        let wait = ctx.read_wait();
        let res = self.backend.read(ctx, buf, wait);
        trace!(url = ctx.url(), len = buf.len(), ?wait, ?res, "imem read");
        res
    }

    pub fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError> {
        let res = self.backend.write(ctx, buf);
        trace!(url = ctx.url(), len = buf.len(), ?res, "imem write");
        res
    }

    pub fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError> {
        let res = self.backend.get_handle(ctx);
        trace!(url = ctx.url(), ?res, "imem get_handle");
        res
    }

    pub fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError> {
        let res = self.backend.check(ctx, mask);
        trace!(url = ctx.url(), ?mask, ?res, "imem check");
        res
    }
}

#[cfg(feature = "protocol")]
impl ImemProtocol {
    pub fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError> {
        let res = self.backend.open(ctx, url, flags);
        trace!(url, ?flags, ?res, "imem open");
        res
    }

    pub fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        let res = self.backend.seek(ctx, pos, whence);
        trace!(url = ctx.url(), pos, %whence, ?res, "imem seek");
        res
    }

    pub fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError> {
        let res = self.backend.close(ctx);
        trace!(url = ctx.url(), ?res, "imem close");
        res
    }
}

#[cfg(feature = "protocol")]
impl UrlProtocol for ImemProtocol {
    fn name(&self) -> &'static str {
        SCHEME
    }

    fn options(&self) -> &'static [crate::config::OptionDescriptor] {
        crate::config::OPTIONS
    }

    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError> {
        ImemProtocol::open(self, ctx, url, flags)
    }

    fn read(&self, ctx: &mut UrlContext, buf: &mut [u8]) -> Result<usize, ImemError> {
        ImemProtocol::read(self, ctx, buf)
    }

    fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError> {
        ImemProtocol::write(self, ctx, buf)
    }

    fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        ImemProtocol::seek(self, ctx, pos, whence)
    }

    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError> {
        ImemProtocol::close(self, ctx)
    }

    fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError> {
        ImemProtocol::get_handle(self, ctx)
    }

    fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError> {
        ImemProtocol::check(self, ctx, mask)
    }
}
