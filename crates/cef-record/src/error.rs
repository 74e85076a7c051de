//! Error types for the record layer
//!
//! - [`StoreError`]: loading the snapshot failed (fatal at startup)
//! - [`FieldError`]: one record carries a list column that could not be decoded

use crate::record::RecordId;
use std::path::PathBuf;

/// Errors while loading or building the record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error reading the source
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source content is not a list of project records
    #[error("cannot parse records from {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Two records share an identifier
    #[error("duplicate record_id: {0}")]
    DuplicateRecordId(RecordId),

    /// Source could not be reached at all
    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create parse error for a source description
    pub fn parse_error(origin: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}

/// A list column held a shape that is not a list of entries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {field}: {reason}")]
pub struct FieldError {
    /// Column name (`owners`, `capital_mix`)
    pub field: &'static str,
    /// Why decoding failed
    pub reason: String,
}

impl FieldError {
    /// Create a field error
    #[inline]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
