//! Query execution: match every entry, score, sort, truncate.

use super::corpus::{Corpus, Entry};
use super::matching::{MatchTier, Matcher, TierMatch};
use super::query::SearchQuery;
use super::scoring::{MatchOutcome, Ranker};
use crate::config::Config;
use crate::error::QueryError;
use crate::schema::Item;
use serde::Serialize;
use std::cmp::Ordering;

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub library: String,
    pub path: String,
    pub item: Item,
    pub score: u32,
    pub name_tier: Option<MatchTier>,
    pub type_tier: Option<MatchTier>,
}

/// Ranked hits plus bookkeeping about the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchResult>,
    /// Number of matching items before the limit was applied.
    pub total_matches: usize,
    /// Generation of the corpus the query ran against.
    pub generation: u64,
    /// Whether the scan budget stopped the scan before the end of the corpus.
    pub truncated: bool,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

/// Stateless query executor built from configuration.
#[derive(Debug, Clone)]
pub struct Searcher {
    matcher: Matcher,
    ranker: Ranker,
    scan_budget: Option<usize>,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

struct Candidate<'c> {
    entry: &'c Entry,
    outcome: MatchOutcome,
    score: u32,
}

impl Searcher {
    pub fn new(config: &Config) -> Self {
        Self {
            matcher: Matcher::new(&config.matching),
            ranker: Ranker::new(config.scoring.clone()),
            scan_budget: config.search.scan_budget(),
        }
    }

    /// Override the scan budget; `None` scans the whole corpus.
    #[must_use]
    pub const fn with_scan_budget(mut self, scan_budget: Option<usize>) -> Self {
        self.scan_budget = scan_budget;
        self
    }

    /// Search `corpus` for `query`, returning at most `limit` ranked results.
    pub fn search(&self, query: &str, corpus: &Corpus, limit: usize) -> Result<SearchResults, QueryError> {
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }

        let mut results = SearchResults {
            generation: corpus.generation(),
            ..SearchResults::default()
        };

        let Some(query) = SearchQuery::parse(query) else {
            return Ok(results);
        };

        let start = std::time::Instant::now();
        let entries = corpus.entries();
        let scanned = match self.scan_budget {
            Some(budget) if budget < entries.len() => {
                results.truncated = true;
                &entries[..budget]
            }
            _ => entries,
        };

        let mut candidates: Vec<Candidate<'_>> = scanned
            .iter()
            .filter_map(|entry| self.evaluate(&query, corpus, entry))
            .collect();

        candidates.sort_by(|a, b| compare(corpus, a, b));
        results.total_matches = candidates.len();
        results.results = candidates
            .into_iter()
            .take(limit)
            .map(|candidate| to_result(corpus, candidate))
            .collect();

        tracing::debug!(
            "Query {:?}: {} matches of {} scanned entries (truncated: {}) in {:?}",
            query,
            results.total_matches,
            scanned.len(),
            results.truncated,
            start.elapsed()
        );

        Ok(results)
    }

    fn evaluate<'c>(&self, query: &SearchQuery, corpus: &Corpus, entry: &'c Entry) -> Option<Candidate<'c>> {
        let item = &corpus.library_at(entry.library).items[entry.item];
        if !query.admits_kind(item.kind) || !parents_end_with(&entry.parents, &query.path) {
            return None;
        }

        let name = if query.has_name() {
            Some(self.matcher.tier(&entry.name, &query.name)?)
        } else {
            None
        };

        let types = if query.has_type_hints() {
            Some(self.match_types(query, entry)?)
        } else {
            None
        };

        let outcome = MatchOutcome { name, types };
        let score = self.ranker.score(&outcome, &entry.qualified_path)?;
        Some(Candidate { entry, outcome, score })
    }

    /// Every hint must be satisfied: the return hint by the return type, each
    /// parameter hint by at least one parameter. The worst hint tier wins, and
    /// length differences add up.
    fn match_types(&self, query: &SearchQuery, entry: &Entry) -> Option<TierMatch> {
        let signature = entry.signature.as_ref()?;
        let mut combined: Option<TierMatch> = None;
        let mut merge = |hit: TierMatch| {
            combined = Some(match combined {
                None => hit,
                Some(prev) => TierMatch {
                    tier: prev.tier.max(hit.tier),
                    length_delta: prev.length_delta + hit.length_delta,
                },
            });
        };

        for hint in &query.params {
            let best = signature
                .inputs
                .iter()
                .filter_map(|input| self.matcher.tier(input, hint))
                .min_by_key(|hit| (hit.tier, hit.length_delta))?;
            merge(best);
        }

        if let Some(hint) = &query.returns {
            let output = signature.output.as_deref()?;
            merge(self.matcher.tier(output, hint)?);
        }

        combined
    }
}

/// Whether `parents` ends with the (already folded) query path components.
fn parents_end_with(parents: &[String], components: &[String]) -> bool {
    components.len() <= parents.len() && parents[parents.len() - components.len()..] == *components
}

/// Score descending, then library name, qualified path, and generation order.
fn compare(corpus: &Corpus, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| {
            let a_lib = &corpus.library_at(a.entry.library).name;
            let b_lib = &corpus.library_at(b.entry.library).name;
            a_lib.cmp(b_lib)
        })
        .then_with(|| a.entry.qualified_path.cmp(&b.entry.qualified_path))
        .then_with(|| (a.entry.library, a.entry.item).cmp(&(b.entry.library, b.entry.item)))
}

fn to_result(corpus: &Corpus, candidate: Candidate<'_>) -> SearchResult {
    let library = corpus.library_at(candidate.entry.library);
    SearchResult {
        library: library.name.clone(),
        path: candidate.entry.qualified_path.clone(),
        item: library.items[candidate.entry.item].clone(),
        score: candidate.score,
        name_tier: candidate.outcome.name.map(|hit| hit.tier),
        type_tier: candidate.outcome.types.map(|hit| hit.tier),
    }
}

/// Search with the default configuration.
pub fn search(query: &str, corpus: &Corpus, limit: usize) -> Result<SearchResults, QueryError> {
    Searcher::default().search(query, corpus, limit)
}
