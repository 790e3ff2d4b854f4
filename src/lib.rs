//! Ranked search over rustdoc documentation indexes.
//!
//! Libraries are described by a compact [`LibraryIndex`] schema, decoded from
//! `search-index.js`, schema JSON, rustdoc JSON or binary snapshots. A
//! [`SearchEngine`] owns the immutable [`Corpus`] built from them and answers
//! name and signature queries with tiered matching and deterministic ranking.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod schema;
pub mod search;
pub mod server;
pub mod source;
pub mod state;
pub mod tools;
pub mod tracing;
pub mod worker;

pub use config::Config;
pub use error::{DecodeError, IntegrityViolation, LoadError, QueryError, Result};
pub use schema::{Item, ItemKind, LibraryIndex, Param, PathEntry, Signature, TypeRef};
pub use search::{Corpus, MatchTier, SearchResult, SearchResults, Searcher};
pub use server::SearchServer;
pub use state::{ReloadSummary, SearchEngine};
