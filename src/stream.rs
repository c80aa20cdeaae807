//! `std::io` access to an opened imem URL.
//!
//! The adapter hands back whatever the backend returns, including
//! `WouldBlock` after a bounded wait. `ImemStream` is the caller-side loop that
//! turns those raw results into ordinary blocking `Read`/`Write`/`Seek`
//! behavior.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::adapter::ImemProtocol;
use crate::config::ImemOptions;
use crate::error::{ImemError, Operation};
use crate::protocol::{Access, OpenFlags, UrlContext, Whence};

const FAST_RETRIES: u32 = 5;
const RETRY_SLEEP: Duration = Duration::from_millis(1);

/// An opened imem URL usable through the `std::io` traits.
///
/// Dropping the stream closes the session; use [`ImemStream::close`] to see
/// the backend's close result.
#[derive(Debug)]
pub struct ImemStream {
    protocol: ImemProtocol,
    ctx: UrlContext,
    rw_timeout: Option<Duration>,
    closed: bool,
}

impl ImemStream {
    /// Create a context for `url` and open it through `protocol`.
    pub fn open(
        protocol: ImemProtocol,
        url: &str,
        flags: OpenFlags,
        options: ImemOptions,
    ) -> Result<Self, ImemError> {
        let mut ctx = UrlContext::new(url, flags).with_options(options);
        protocol.open(&mut ctx, url, flags)?;
        Ok(Self::from_context(protocol, ctx))
    }

    /// Wrap a context that `protocol` has already opened.
    pub fn from_context(protocol: ImemProtocol, ctx: UrlContext) -> Self {
        Self {
            protocol,
            ctx,
            rw_timeout: None,
            closed: false,
        }
    }

    /// Give up on a transfer that keeps reporting `WouldBlock` for longer than
    /// `timeout`. Without it, blocking transfers retry indefinitely.
    pub fn with_rw_timeout(mut self, timeout: Duration) -> Self {
        self.rw_timeout = Some(timeout);
        self
    }

    pub fn context(&self) -> &UrlContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut UrlContext {
        &mut self.ctx
    }

    /// Read once, retrying `WouldBlock` and interrupts in blocking mode.
    pub fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, ImemError> {
        let n = buf.len().min(self.ctx.options().max_transfer());
        let buf = &mut buf[..n];
        self.retry_transfer(|p, ctx| p.read(ctx, buf))
    }

    /// Write once, retrying `WouldBlock` and interrupts in blocking mode.
    pub fn write_some(&mut self, buf: &[u8]) -> Result<usize, ImemError> {
        let n = buf.len().min(self.ctx.options().max_transfer());
        let buf = &buf[..n];
        self.retry_transfer(|p, ctx| p.write(ctx, buf))
    }

    /// Whether the backend marked the resource as seekable when it opened it.
    pub fn is_seekable(&self) -> bool {
        !self.ctx.is_streamed()
    }

    /// Seek through the backend. Streamed resources refuse without asking it.
    pub fn seek_to(&mut self, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        if self.ctx.is_streamed() {
            return Err(ImemError::Unsupported { op: Operation::Seek });
        }
        self.protocol.seek(&mut self.ctx, pos, whence)
    }

    /// Total size of the resource, as reported by the backend.
    pub fn size(&mut self) -> Result<u64, ImemError> {
        self.seek_to(0, Whence::Size)
    }

    pub fn get_handle(&mut self) -> Result<i32, ImemError> {
        self.protocol.get_handle(&mut self.ctx)
    }

    pub fn check(&mut self, mask: Access) -> Result<Access, ImemError> {
        self.protocol.check(&mut self.ctx, mask)
    }

    /// Close the session and report the backend's result.
    pub fn close(mut self) -> Result<(), ImemError> {
        self.closed = true;
        self.protocol.close(&mut self.ctx)
    }

    fn retry_transfer<F>(&mut self, mut op: F) -> Result<usize, ImemError>
    where
        F: FnMut(&ImemProtocol, &mut UrlContext) -> Result<usize, ImemError>,
    {
        let nonblock = self.ctx.flags().nonblock;
        let mut fast_retries = FAST_RETRIES;
        let mut wait_since: Option<Instant> = None;

        loop {
            match op(&self.protocol, &mut self.ctx) {
                Err(e) if e.is_interrupted() => continue,
                Err(e) if e.is_would_block() => {
                    if nonblock {
                        return Err(e);
                    }
                    if fast_retries > 0 {
                        fast_retries -= 1;
                        continue;
                    }
                    if let Some(timeout) = self.rw_timeout {
                        let since = *wait_since.get_or_insert_with(Instant::now);
                        if since.elapsed() >= timeout {
                            trace!(url = self.ctx.url(), ?timeout, "imem transfer timed out");
                            return Err(ImemError::TimedOut);
                        }
                    }
                    thread::sleep(RETRY_SLEEP);
                }
                other => return other,
            }
        }
    }
}

impl Read for ImemStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_some(buf)?)
    }
}

impl Write for ImemStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_some(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for ImemStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(p) => {
                let p = i64::try_from(p).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset exceeds i64")
                })?;
                (p, Whence::Start)
            }
            SeekFrom::Current(p) => (p, Whence::Current),
            SeekFrom::End(p) => (p, Whence::End),
        };
        Ok(self.seek_to(offset, whence)?)
    }
}

impl Drop for ImemStream {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.protocol.close(&mut self.ctx) {
            warn!(url = self.ctx.url(), error = %e, "imem close on drop failed");
        }
    }
}
