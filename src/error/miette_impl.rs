//! Miette integration for pretty error reporting.

use miette::{Diagnostic, Severity};
use thiserror::Error;

use super::ImemError;

/// A diagnostic wrapper for imem errors compatible with miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct ImemDiagnostic {
    /// The error message
    pub message: String,

    #[source]
    /// The underlying error
    pub source: Option<ImemError>,

    #[help]
    /// Help text for the user
    pub help: Option<String>,

    #[diagnostic(severity)]
    pub severity: Severity,
}

fn help_for(e: &ImemError) -> Option<String> {
    match e {
        ImemError::Unconfigured { op } => Some(format!(
            "register a callback table with a '{op}' callback before opening imem URLs"
        )),
        ImemError::Unsupported { .. } => {
            Some("the active backend does not implement this operation".into())
        }
        ImemError::WouldBlock => {
            Some("retry the transfer, or open the URL without `nonblock`".into())
        }
        ImemError::InvalidOption { .. } => {
            Some("valid options: truncate=<0|1>, blocksize=<1..2147483647>".into())
        }
        _ => None,
    }
}

impl From<ImemError> for ImemDiagnostic {
    fn from(e: ImemError) -> Self {
        let severity = if e.is_would_block() {
            Severity::Warning
        } else {
            Severity::Error
        };
        ImemDiagnostic {
            message: format!("imem status {}", e.code()),
            help: help_for(&e),
            source: Some(e),
            severity,
        }
    }
}

impl From<ImemError> for miette::Report {
    fn from(e: ImemError) -> Self {
        miette::Report::new(ImemDiagnostic::from(e))
    }
}
