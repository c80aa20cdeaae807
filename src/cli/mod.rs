//! CLI integration helpers for imem.
//!
//! This module turns command-line style option assignments into
//! `ImemOptions`. With the `sarge` feature, `OptionArgs` can be read directly
//! by a sarge `ArgumentReader`.
//!
//! # Example
//!
//! ```rust,ignore
//! use imem::cli::{OptionArgs, options_for_url};
//!
//! let extra = OptionArgs::new().with("truncate", "0");
//! let opts = options_for_url("imem:clip?blocksize=4096", &extra)?;
//! assert_eq!(opts.blocksize, 4096);
//! assert!(!opts.truncate);
//! ```

use crate::config::ImemOptions;
use crate::error::ImemError;

#[cfg(feature = "sarge")]
mod sarge;

/// Option assignments collected from the command line, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionArgs(pub Vec<(String, String)>);

impl OptionArgs {
    /// Create an empty assignment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    /// Apply every assignment on top of `base`. Later assignments win.
    pub fn apply(&self, base: ImemOptions) -> Result<ImemOptions, ImemError> {
        let mut opts = base;
        for (name, value) in &self.0 {
            opts.set(name, value)?;
        }
        Ok(opts)
    }
}

/// Parse a single `name=value` token. A bare `name` means `name=1`.
pub fn parse_assignment(token: &str) -> Option<(String, String)> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let (name, value) = token.split_once('=').unwrap_or((token, "1"));
    Some((name.trim().to_string(), value.trim().to_string()))
}

/// Split `url` into its location and optional query string.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    }
}

/// Resolve the options for `url`: defaults, then the URL's query string,
/// then `extra`.
pub fn options_for_url(url: &str, extra: &OptionArgs) -> Result<ImemOptions, ImemError> {
    let base = match split_url(url).1 {
        Some(query) => ImemOptions::from_query(query)?,
        None => ImemOptions::default(),
    };
    extra.apply(base)
}
