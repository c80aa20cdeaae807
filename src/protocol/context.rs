//! Per-instance protocol state.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use super::OpenFlags;
use crate::config::ImemOptions;

/// Bounded wait a blocking read may spend before reporting `WouldBlock`.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// How long a backend `read` may wait when no data is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWait {
    /// Return `WouldBlock` immediately.
    NonBlocking,
    /// Wait at most this long, then return `WouldBlock`.
    Timeout(Duration),
}

/// State for one opened URL.
///
/// Created by the host before `open` and passed to every operation. The
/// private-data slot belongs to the backend: `open` may park a cursor or a
/// descriptor there and later operations read it back.
pub struct UrlContext {
    url: String,
    flags: OpenFlags,
    options: ImemOptions,
    read_timeout: Duration,
    is_streamed: bool,
    priv_data: Option<Box<dyn Any + Send>>,
}

impl fmt::Debug for UrlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlContext")
            .field("url", &self.url)
            .field("flags", &self.flags)
            .field("options", &self.options)
            .field("read_timeout", &self.read_timeout)
            .field("is_streamed", &self.is_streamed)
            .field("has_priv_data", &self.priv_data.is_some())
            .finish()
    }
}

impl UrlContext {
    /// Create a context with default options.
    pub fn new(url: impl Into<String>, flags: OpenFlags) -> Self {
        Self {
            url: url.into(),
            flags,
            options: ImemOptions::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            is_streamed: false,
            priv_data: None,
        }
    }

    /// Set the option view.
    pub fn with_options(mut self, options: ImemOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the bounded wait for blocking reads.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn options(&self) -> &ImemOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ImemOptions {
        &mut self.options
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// The wait a backend read should honor for this context.
    pub fn read_wait(&self) -> ReadWait {
        if self.flags.nonblock {
            ReadWait::NonBlocking
        } else {
            ReadWait::Timeout(self.read_timeout)
        }
    }

    /// Whether the resource is a non-seekable stream.
    pub fn is_streamed(&self) -> bool {
        self.is_streamed
    }

    pub fn set_streamed(&mut self, streamed: bool) {
        self.is_streamed = streamed;
    }

    /// Store backend state, replacing anything stored before.
    pub fn set_priv_data<T: Any + Send>(&mut self, data: T) {
        self.priv_data = Some(Box::new(data));
    }

    pub fn has_priv_data(&self) -> bool {
        self.priv_data.is_some()
    }

    /// Borrow backend state if it is present and of type `T`.
    pub fn priv_data<T: Any + Send>(&self) -> Option<&T> {
        self.priv_data.as_ref()?.downcast_ref::<T>()
    }

    pub fn priv_data_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.priv_data.as_mut()?.downcast_mut::<T>()
    }

    /// Remove backend state of type `T`. State of another type is left alone.
    pub fn take_priv_data<T: Any + Send>(&mut self) -> Option<T> {
        match self.priv_data.take()?.downcast::<T>() {
            Ok(data) => Some(*data),
            Err(other) => {
                self.priv_data = Some(other);
                None
            }
        }
    }

    /// Drop whatever backend state is stored.
    pub fn clear_priv_data(&mut self) {
        self.priv_data = None;
    }
}
