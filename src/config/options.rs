//! Per-instance protocol options.

use serde::Deserialize;

use crate::error::ImemError;

/// Value type of a declared option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
}

/// Declaration of one option recognised on an opened instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: OptionKind,
    pub default: i64,
    pub min: i64,
    pub max: i64,
}

/// Options exposed to the host's option mechanism.
pub const OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: "truncate",
        help: "Truncate existing files on write",
        kind: OptionKind::Bool,
        default: 1,
        min: 0,
        max: 1,
    },
    OptionDescriptor {
        name: "blocksize",
        help: "set I/O operation maximum block size",
        kind: OptionKind::Int,
        default: i32::MAX as i64,
        min: 1,
        max: i32::MAX as i64,
    },
];

/// Look up an option declaration by name.
pub fn find_option(name: &str) -> Option<&'static OptionDescriptor> {
    OPTIONS.iter().find(|o| o.name == name)
}

fn default_truncate() -> bool {
    true
}

fn default_blocksize() -> u32 {
    i32::MAX as u32
}

/// Configuration view of an opened imem instance.
///
/// The protocol adapter carries these values but never acts on them; the
/// registered backend decides what `truncate` and `blocksize` mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImemOptions {
    /// Truncate existing content when opened for writing
    #[serde(default = "default_truncate")]
    pub truncate: bool,
    /// Advisory maximum transfer size per read/write call. Read it through
    /// [`ImemOptions::max_transfer`], which keeps it within range.
    #[serde(default = "default_blocksize", deserialize_with = "de_blocksize")]
    pub blocksize: u32,
}

impl Default for ImemOptions {
    fn default() -> Self {
        Self {
            truncate: default_truncate(),
            blocksize: default_blocksize(),
        }
    }
}

fn de_blocksize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    check_range("blocksize", raw).map_err(serde::de::Error::custom)?;
    Ok(raw as u32)
}

fn clamp_blocksize(blocksize: u32) -> u32 {
    blocksize.clamp(1, default_blocksize())
}

fn check_range(name: &str, value: i64) -> Result<i64, ImemError> {
    let desc = find_option(name).ok_or_else(|| ImemError::InvalidOption {
        name: name.to_string(),
        reason: "unknown option".into(),
    })?;
    if value < desc.min || value > desc.max {
        return Err(ImemError::InvalidOption {
            name: name.to_string(),
            reason: format!("{value} out of range [{}, {}]", desc.min, desc.max),
        });
    }
    Ok(value)
}

fn parse_value(desc: &OptionDescriptor, value: &str) -> Result<i64, ImemError> {
    let value = value.trim();
    let parsed = match desc.kind {
        OptionKind::Bool => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(1),
            "0" | "false" | "no" | "off" => Some(0),
            _ => None,
        },
        OptionKind::Int => value.parse::<i64>().ok(),
    };
    parsed.ok_or_else(|| ImemError::InvalidOption {
        name: desc.name.to_string(),
        reason: format!("cannot parse '{value}'"),
    })
}

impl ImemOptions {
    /// Create options with every value at its declared default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the truncate flag.
    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Set the block size, clamped into the declared `1..=i32::MAX` range.
    pub fn with_blocksize(mut self, blocksize: u32) -> Self {
        self.blocksize = clamp_blocksize(blocksize);
        self
    }

    /// Apply a single option by name from its textual value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ImemError> {
        let desc = find_option(name).ok_or_else(|| ImemError::InvalidOption {
            name: name.to_string(),
            reason: "unknown option".into(),
        })?;
        let v = check_range(desc.name, parse_value(desc, value)?)?;
        match desc.name {
            "truncate" => self.truncate = v != 0,
            "blocksize" => self.blocksize = v as u32,
            _ => unreachable!("every declared option is handled"),
        }
        Ok(())
    }

    /// Build options from `(name, value)` pairs, starting from the defaults.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ImemError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut opts = Self::default();
        for (k, v) in pairs {
            opts.set(k.as_ref(), v.as_ref())?;
        }
        Ok(opts)
    }

    /// Parse a `name=value&name=value` string. A bare name sets a boolean.
    pub fn from_query(query: &str) -> Result<Self, ImemError> {
        let pairs = query
            .split('&')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|kv| match kv.split_once('=') {
                Some((k, v)) => (k, v),
                None => (kv, "1"),
            });
        Self::from_pairs(pairs)
    }

    /// Load options from a JSON document.
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self, ImemError> {
        serde_json::from_str(s).map_err(|e| ImemError::InvalidOption {
            name: "<json>".into(),
            reason: e.to_string(),
        })
    }

    /// Load options from a YAML document.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(s: &str) -> Result<Self, ImemError> {
        serde_yaml::from_str(s).map_err(|e| ImemError::InvalidOption {
            name: "<yaml>".into(),
            reason: e.to_string(),
        })
    }

    /// The block size as a `usize` transfer cap, never zero even when the
    /// public field was set out of range.
    pub fn max_transfer(&self) -> usize {
        clamp_blocksize(self.blocksize) as usize
    }
}
