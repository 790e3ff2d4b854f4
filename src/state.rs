//! Shared engine state: the published corpus and the searcher configured for it.
//!
//! Readers pin the current `Arc<Corpus>` for the duration of one query; `reload`
//! builds a replacement corpus in isolation and publishes it with a single atomic
//! store. A query therefore sees either the old or the new corpus, never a mix,
//! and a failed reload leaves the published corpus untouched.

use crate::config::Config;
use crate::error::{LoadError, QueryError};
use crate::schema::LibraryIndex;
use crate::search::{Corpus, SearchResults, Searcher};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub generation: u64,
    pub libraries: usize,
    pub items: usize,
}

/// A live search engine over an atomically replaceable corpus.
pub struct SearchEngine {
    corpus: ArcSwap<Corpus>,
    searcher: Searcher,
    default_limit: usize,
    next_generation: AtomicU64,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let corpus = self.corpus.load();
        f.debug_struct("SearchEngine")
            .field("generation", &corpus.generation())
            .field("items", &corpus.item_count())
            .field("default_limit", &self.default_limit)
            .finish()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl SearchEngine {
    /// Create an engine with an empty corpus (generation 0).
    pub fn new(config: &Config) -> Self {
        Self {
            corpus: ArcSwap::from_pointee(Corpus::empty()),
            searcher: Searcher::new(config),
            default_limit: config.search.default_limit,
            next_generation: AtomicU64::new(1),
        }
    }

    /// Create an engine and load an initial set of libraries.
    pub fn with_libraries(config: &Config, libraries: Vec<LibraryIndex>) -> Result<Self, LoadError> {
        let engine = Self::new(config);
        engine.reload(libraries)?;
        Ok(engine)
    }

    /// Replace the whole corpus. On error the published corpus is unchanged.
    pub fn reload(&self, libraries: Vec<LibraryIndex>) -> Result<ReloadSummary, LoadError> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let corpus = Corpus::load_generation(libraries, generation).inspect_err(|e| {
            tracing::warn!("Reload rejected, keeping generation {}: {}", self.generation(), e);
        })?;

        let summary = ReloadSummary {
            generation,
            libraries: corpus.libraries().count(),
            items: corpus.item_count(),
        };
        self.corpus.store(Arc::new(corpus));

        tracing::info!(
            "Published corpus generation {} ({} libraries, {} items)",
            summary.generation,
            summary.libraries,
            summary.items
        );
        Ok(summary)
    }

    /// Search the currently published corpus.
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchResults, QueryError> {
        self.search_pinned(query, limit).map(|(_, results)| results)
    }

    /// Search and hand back the corpus the results were computed against.
    pub fn search_pinned(&self, query: &str, limit: usize) -> Result<(Arc<Corpus>, SearchResults), QueryError> {
        let corpus = self.corpus.load_full();
        let results = self.searcher.search(query, &corpus, limit)?;
        Ok((corpus, results))
    }

    /// Search with the configured default limit.
    pub fn search_default(&self, query: &str) -> Result<SearchResults, QueryError> {
        self.search(query, self.default_limit)
    }

    /// Pin the currently published corpus.
    pub fn corpus(&self) -> Arc<Corpus> {
        self.corpus.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.corpus.load().generation()
    }

    pub const fn default_limit(&self) -> usize {
        self.default_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Item, ItemKind};
    use assert2::{check, let_assert};

    fn library(name: &str, items: &[&str]) -> LibraryIndex {
        let mut library = LibraryIndex::new(name);
        library.items = items
            .iter()
            .map(|item| Item::new(ItemKind::Function, *item))
            .collect();
        library
    }

    #[test]
    fn test_new_engine_is_empty() {
        let engine = SearchEngine::default();
        check!(engine.generation() == 0);
        check!(engine.corpus().is_empty());
        check!(engine.search("anything", 5).unwrap().is_empty());
    }

    #[test]
    fn test_reload_bumps_generation() {
        let engine = SearchEngine::default();
        let first = engine.reload(vec![library("a", &["alpha"])]).unwrap();
        let second = engine.reload(vec![library("b", &["beta", "bravo"])]).unwrap();

        check!(first.generation == 1);
        check!(second == ReloadSummary { generation: 2, libraries: 1, items: 2 });
        check!(engine.search("alpha", 5).unwrap().is_empty());
        check!(engine.search("beta", 5).unwrap().generation == 2);
    }

    #[test]
    fn test_failed_reload_keeps_previous_corpus() {
        let engine = SearchEngine::default();
        engine.reload(vec![library("a", &["alpha"])]).unwrap();

        let_assert!(Err(LoadError::DuplicateLibrary { .. }) = engine.reload(vec![library("b", &[]), library("b", &[])]));
        check!(engine.generation() == 1);
        check!(engine.search("alpha", 5).unwrap().len() == 1);
    }

    #[test]
    fn test_pinned_corpus_survives_reload() {
        let engine = SearchEngine::default();
        engine.reload(vec![library("a", &["alpha"])]).unwrap();
        let pinned = engine.corpus();

        engine.reload(vec![library("b", &["beta"])]).unwrap();
        check!(pinned.library("a").is_some());
        check!(engine.corpus().library("a").is_none());
    }

    #[test]
    fn test_search_default_uses_configured_limit() {
        let mut config = Config::default();
        config.search.default_limit = 1;
        let engine = SearchEngine::with_libraries(&config, vec![library("a", &["ab", "abc"])]).unwrap();

        let results = engine.search_default("ab").unwrap();
        check!(results.len() == 1);
        check!(results.total_matches == 2);
    }
}
