//! Error handling types and utilities.

use thiserror::Error;

/// A specialized Result type for I/O and binary glue.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods. Engine operations return the typed errors below.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a set of library indexes cannot be loaded into a corpus.
///
/// A failed load never replaces an already published corpus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A library violates the schema or its referential integrity.
    #[error("malformed index for library '{library}': {violation}")]
    MalformedIndex {
        library: String,
        violation: IntegrityViolation,
    },
    /// Two payloads carry the same library name.
    #[error("library '{name}' is loaded more than once")]
    DuplicateLibrary { name: String },
}

/// First schema violation found while validating a library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    #[error("library name is empty")]
    EmptyLibraryName,
    #[error("item #{item} has an empty name")]
    EmptyItemName { item: usize },
    #[error("item #{item} ('{name}') has parent {index}, but the path table holds {len} entries")]
    ParentOutOfBounds {
        item: usize,
        name: String,
        index: usize,
        len: usize,
    },
    #[error(
        "item #{item} ('{name}') references path {index} in its {position}, but the path table holds {len} entries"
    )]
    TypeOutOfBounds {
        item: usize,
        name: String,
        position: TypePosition,
        index: usize,
        len: usize,
    },
}

/// Where in a signature a type reference appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePosition {
    Input(usize),
    Output,
}

impl std::fmt::Display for TypePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(position) => write!(f, "parameter {}", position),
            Self::Output => f.write_str("return type"),
        }
    }
}

/// Error returned for invalid query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("limit must be greater than zero")]
    InvalidLimit,
}

/// Error returned when a payload cannot be decoded into library indexes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload format not recognized")]
    UnknownFormat,
    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot payload: {0}")]
    Snapshot(#[from] postcard::Error),
    #[error("snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u8, expected: u8 },
    #[error("library '{library}' uses unknown item kind code {code}")]
    UnknownKind { library: String, code: u8 },
    #[error("rustdoc JSON has no named root module")]
    UnnamedCrate,
    #[error("search-index script contains no library entries")]
    EmptyScript,
}
