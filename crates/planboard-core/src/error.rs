use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlDeError;
use toml::ser::Error as TomlSerError;

use crate::types::BlockedEntry;

/// Result type for planboard operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while editing or synchronizing the board.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlDeError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] TomlSerError),

    /// A cell coordinate did not address a valid project row or date.
    #[error("invalid cell coordinate: {0}")]
    InvalidCoord(String),

    /// The session has observer role and may not mutate the board.
    #[error("read-only session: mutation rejected")]
    ReadOnly,

    /// A personnel assignment was rejected due to availability conflicts.
    ///
    /// Carries the specific blocking entries; no partial write happened.
    #[error("assignment blocked for {} person(s)", .0.len())]
    Blocked(Vec<BlockedEntry>),

    /// A paste was requested before any cell was copied.
    #[error("clipboard is empty")]
    EmptyClipboard,

    /// The remote store rejected the operation or returned a malformed payload.
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient errors like network failures. Conflict
    /// and validation errors only go away when the input changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Store(_))
    }

    /// Returns the blocking entries if this is a conflict rejection.
    pub fn blocked_entries(&self) -> Option<&[BlockedEntry]> {
        match self {
            Self::Blocked(entries) => Some(entries),
            _ => None,
        }
    }
}
