//! # imem
//!
//! A pluggable I/O backend behind a fixed protocol interface.
//!
//! ## Overview
//!
//! imem provides:
//! - **Protocol adapter**: `ImemProtocol` implements the host-facing
//!   `UrlProtocol` interface (open/read/write/seek/close/get_handle/check) for
//!   the `imem` scheme and performs no I/O itself
//! - **Pluggable backends**: every call is forwarded, unchanged, to an
//!   `ImemBackend` supplied at runtime
//! - **Callback tables**: build a backend from individual closures with
//!   `CallbackTable`; empty slots report `ImemError::Unconfigured`
//! - **Registry**: `CallbackRegistry` holds a replaceable backend, with a
//!   process-wide instance behind `set_callbacks`
//! - **Streams**: `ImemStream` adds the caller-side retry loop and exposes an
//!   opened URL through `std::io::{Read, Write, Seek}`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::io::{Read, Write};
//! use std::sync::Arc;
//!
//! use imem::{ImemOptions, ImemProtocol, ImemStream, MemoryBackend, OpenFlags};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new();
//!     let protocol = ImemProtocol::new(Arc::new(backend.clone()));
//!
//!     let mut out = ImemStream::open(
//!         protocol.clone(),
//!         "imem:clip",
//!         OpenFlags::write_only(),
//!         ImemOptions::default(),
//!     )?;
//!     out.write_all(b"hello")?;
//!     out.close()?;
//!
//!     let mut input = ImemStream::open(
//!         protocol,
//!         "imem:clip",
//!         OpenFlags::read_only(),
//!         ImemOptions::default().with_blocksize(2),
//!     )?;
//!     let mut text = String::new();
//!     input.read_to_string(&mut text)?;
//!     assert_eq!(text, "hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `protocol` - The addressable scheme: open/seek/close, `UrlProtocol` and
//!   `ImemStream` (enabled by default). Without it only the raw
//!   read/write/get_handle/check subset of `ImemProtocol` is compiled
//! - `json` / `yaml` - Load `ImemOptions` from configuration documents
//! - `miette` - Pretty error reporting with miette
//! - `sarge` - The `imem_probe` command-line tool

pub mod adapter;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod protocol;
#[cfg(feature = "protocol")]
pub mod stream;

pub use adapter::{ImemProtocol, SCHEME};
pub use backend::{
    CallbackRegistry, CallbackTable, ImemBackend, MemoryBackend, global, set_callbacks,
};
pub use config::{ImemOptions, OPTIONS, OptionDescriptor};
pub use error::{ImemError, Operation, status};
pub use protocol::{
    Access, DEFAULT_READ_TIMEOUT, OpenFlags, ReadWait, UrlContext, UrlProtocol, Whence,
};
#[cfg(feature = "protocol")]
pub use stream::ImemStream;

// Miette re-exports
#[cfg(feature = "miette")]
pub use error::ImemDiagnostic;
