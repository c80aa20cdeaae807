//! Configuration types for imem instances.
//!
//! This module provides:
//! - `ImemOptions`: The per-instance option view (`truncate`, `blocksize`)
//! - `OPTIONS`: Declarations of every option the protocol recognises

mod options;

pub use options::{ImemOptions, OPTIONS, OptionDescriptor, OptionKind, find_option};
