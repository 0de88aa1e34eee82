//! The one error that crosses the library boundary.

use thiserror::Error;

/// Fatal failure to obtain a usable catalog document.
///
/// Everything softer than this (unnamed attributes, odd domain entries,
/// dangling references) is recorded as a skipped record instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The fetch itself failed (unreachable host, unreadable file).
    #[error("failed to fetch catalog: {detail}")]
    Fetch { detail: String },

    /// The fetch completed with a non-success status.
    #[error("catalog request returned HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The body is not JSON, or its top-level container has the wrong shape.
    #[error("catalog document is malformed: {detail}")]
    MalformedJson { detail: String },

    /// The embedded document schema itself could not be compiled.
    #[error("catalog document schema is unusable: {detail}")]
    Schema { detail: String },
}

impl LoadError {
    /// Stable machine-readable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            LoadError::Fetch { .. } => "network",
            LoadError::HttpStatus { .. } => "http_status",
            LoadError::MalformedJson { .. } => "malformed_json",
            LoadError::Schema { .. } => "schema",
        }
    }
}
