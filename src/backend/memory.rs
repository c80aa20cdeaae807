//! In-memory backend.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::ImemBackend;
use crate::error::ImemError;
use crate::protocol::{Access, OpenFlags, ReadWait, UrlContext, Whence};

type SharedBuf = Arc<Mutex<Vec<u8>>>;

/// Largest size a buffer may grow to, and so the furthest a session may seek.
pub const MAX_BUFFER_LEN: u64 = i32::MAX as u64;

#[derive(Debug, Clone)]
struct Entry {
    id: i32,
    data: SharedBuf,
}

/// Per-session cursor kept in the context's private-data slot.
#[derive(Debug)]
struct Session {
    id: i32,
    data: SharedBuf,
    pos: u64,
    flags: OpenFlags,
}

/// Backend storing named byte buffers in process memory.
///
/// URLs map to buffers by their path: `imem:clip`, `imem://clip` and
/// `clip?blocksize=4` all address `clip`. Clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    store: Arc<Mutex<HashMap<String, Entry>>>,
    next_id: Arc<AtomicI32>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Strip the scheme and any query string from `url`.
fn resource_key(url: &str) -> &str {
    let rest = url.strip_prefix("imem:").unwrap_or(url);
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    rest.split_once('?').map_or(rest, |(path, _)| path)
}

fn session_mut(ctx: &mut UrlContext) -> Result<&mut Session, ImemError> {
    ctx.priv_data_mut::<Session>().ok_or(ImemError::NotOpen)
}

fn permission(msg: &'static str) -> ImemError {
    ImemError::Io(io::Error::new(io::ErrorKind::PermissionDenied, msg))
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }

    fn entry(&self, key: &str, create: bool) -> Option<Entry> {
        let mut store = lock(&self.store);
        if let Some(entry) = store.get(key) {
            return Some(entry.clone());
        }
        if !create {
            return None;
        }
        let entry = Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            data: Arc::new(Mutex::new(Vec::new())),
        };
        store.insert(key.to_string(), entry.clone());
        Some(entry)
    }

    /// Store `data` under `url`, replacing existing content.
    pub fn insert(&self, url: &str, data: impl Into<Vec<u8>>) {
        if let Some(entry) = self.entry(resource_key(url), true) {
            *lock(&entry.data) = data.into();
        }
    }

    /// Get a copy of the bytes stored under `url`.
    pub fn contents(&self, url: &str) -> Option<Vec<u8>> {
        let store = lock(&self.store);
        let entry = store.get(resource_key(url))?;
        Some(lock(&entry.data).clone())
    }

    /// Get the contents under `url` as a string.
    pub fn contents_string(&self, url: &str) -> Option<String> {
        self.contents(url)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn contains(&self, url: &str) -> bool {
        lock(&self.store).contains_key(resource_key(url))
    }

    /// Drop the buffer stored under `url`. Open sessions keep their copy alive.
    pub fn remove(&self, url: &str) -> bool {
        lock(&self.store).remove(resource_key(url)).is_some()
    }

    /// Names of every stored buffer, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.store).keys().cloned().collect();
        names.sort();
        names
    }
}

impl ImemBackend for MemoryBackend {
    fn open(&self, ctx: &mut UrlContext, url: &str, flags: OpenFlags) -> Result<(), ImemError> {
        let key = resource_key(url);
        let entry = self
            .entry(key, flags.write && flags.create)
            .ok_or_else(|| ImemError::NotFound {
                url: url.to_string(),
            })?;

        if flags.write && ctx.options().truncate {
            lock(&entry.data).clear();
        }

        debug!(key, id = entry.id, ?flags, "memory session opened");
        ctx.set_priv_data(Session {
            id: entry.id,
            data: entry.data,
            pos: 0,
            flags,
        });
        Ok(())
    }

    fn read(
        &self,
        ctx: &mut UrlContext,
        buf: &mut [u8],
        _wait: ReadWait,
    ) -> Result<usize, ImemError> {
        // In-memory data is always immediately available, so `_wait` never applies.
        let cap = ctx.options().max_transfer();
        let session = session_mut(ctx)?;
        if !session.flags.read {
            return Err(permission("session not opened for reading"));
        }

        let data = lock(&session.data);
        let start = usize::try_from(session.pos).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(cap).min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        drop(data);

        session.pos += n as u64;
        Ok(n)
    }

    fn write(&self, ctx: &mut UrlContext, buf: &[u8]) -> Result<usize, ImemError> {
        let cap = ctx.options().max_transfer();
        let session = session_mut(ctx)?;
        if !session.flags.write {
            return Err(permission("session not opened for writing"));
        }

        let n = buf.len().min(cap);
        let end = session
            .pos
            .checked_add(n as u64)
            .filter(|end| *end <= MAX_BUFFER_LEN)
            .ok_or(ImemError::InvalidSeek {
                offset: i64::try_from(session.pos).unwrap_or(i64::MAX),
            })?;
        // Both fit in usize: they are bounded by MAX_BUFFER_LEN.
        let (start, end) = (session.pos as usize, end as usize);
        let mut data = lock(&session.data);
        let len = data.len();
        if len < end {
            data.try_reserve(end - len).map_err(|_| {
                ImemError::Io(io::Error::from(io::ErrorKind::OutOfMemory))
            })?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(&buf[..n]);
        drop(data);

        session.pos += n as u64;
        Ok(n)
    }

    fn seek(&self, ctx: &mut UrlContext, pos: i64, whence: Whence) -> Result<u64, ImemError> {
        let session = session_mut(ctx)?;
        let len = lock(&session.data).len() as i64;
        let base = match whence {
            Whence::Size => return Ok(len as u64),
            Whence::Start => 0,
            Whence::Current => session.pos as i64,
            Whence::End => len,
        };
        let target = base
            .checked_add(pos)
            .filter(|t| (0..=MAX_BUFFER_LEN as i64).contains(t))
            .ok_or(ImemError::InvalidSeek { offset: pos })?;
        session.pos = target as u64;
        Ok(session.pos)
    }

    fn close(&self, ctx: &mut UrlContext) -> Result<(), ImemError> {
        let session = ctx.take_priv_data::<Session>().ok_or(ImemError::NotOpen)?;
        debug!(id = session.id, url = ctx.url(), "memory session closed");
        Ok(())
    }

    fn get_handle(&self, ctx: &mut UrlContext) -> Result<i32, ImemError> {
        Ok(session_mut(ctx)?.id)
    }

    fn check(&self, ctx: &mut UrlContext, mask: Access) -> Result<Access, ImemError> {
        if !self.contains(ctx.url()) {
            return Ok(Access::NONE);
        }
        Ok(Access::ALL & mask)
    }
}
