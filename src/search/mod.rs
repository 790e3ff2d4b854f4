//! Search infrastructure for documentation indexes.
//!
//! This module provides corpus loading, query parsing, tiered matching and ranking.

// Module declarations
pub(crate) mod corpus;
pub(crate) mod engine;
pub(crate) mod matching;
pub(crate) mod query;
pub(crate) mod scoring;

// Public re-exports (used via lib.rs)
pub use corpus::{Corpus, LibrarySummary};
pub use engine::{SearchResult, SearchResults, Searcher, search};
pub use matching::{MatchTier, Matcher, TierMatch};
pub use query::{SearchQuery, parse_path_components};
pub use scoring::{MatchOutcome, Ranker};
