//! Error types shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`LoadError`], one per failure family the
/// orchestrator has to decide about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Decode,
    Parse,
    Storage,
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading or writing one of the pipeline files failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source bytes are not valid in the legacy encoding.
    #[error("{encoding} decode failed: malformed byte sequence ending at offset {offset}")]
    Decode {
        encoding: &'static str,
        offset: usize,
    },

    /// The canonical text is not well-formed delimited data.
    #[error("CSV parse error at record {record}: {source}")]
    Parse {
        record: u64,
        #[source]
        source: csv::Error,
    },

    /// A row does not carry the fixed positional schema.
    #[error("record {record} has {found} fields, expected {expected}")]
    FieldCount {
        record: u64,
        expected: usize,
        found: usize,
    },

    /// A field carries a quote or line break, left behind by broken quoting.
    #[error("record {record} field {field} is malformed: {value:?}")]
    MalformedField {
        record: u64,
        field: usize,
        value: String,
    },

    /// Schema creation, insert, compaction or close failed.
    #[error("storage error: {0}")]
    Storage(#[from] duckdb::Error),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Io { .. } => ErrorKind::Io,
            LoadError::Decode { .. } => ErrorKind::Decode,
            LoadError::Parse { .. }
            | LoadError::FieldCount { .. }
            | LoadError::MalformedField { .. } => ErrorKind::Parse,
            LoadError::Storage(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
