//! Match tiers: exact, prefix, substring and edit-distance matching.
//!
//! All comparisons operate on strings that have already been case-folded.

use crate::config::MatchingConfig;
use rapidfuzz::distance::levenshtein;
use serde::Serialize;

/// Discrete match quality, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact = 0,
    Prefix = 1,
    Substring = 2,
    Fuzzy = 3,
}

impl MatchTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of matching one candidate string against one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierMatch {
    pub tier: MatchTier,
    /// Absolute difference in length (chars) between candidate and fragment.
    pub length_delta: usize,
}

/// Tier classifier with a configurable fuzzy threshold.
#[derive(Debug, Clone)]
pub struct Matcher {
    fuzzy_divisor: usize,
    min_fuzzy_distance: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl Matcher {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            fuzzy_divisor: config.fuzzy_divisor.max(1),
            min_fuzzy_distance: config.min_fuzzy_distance,
        }
    }

    /// Maximum edit distance accepted for a fragment of `query_len` chars.
    pub const fn fuzzy_threshold(&self, query_len: usize) -> usize {
        let scaled = query_len / self.fuzzy_divisor;
        if scaled > self.min_fuzzy_distance {
            scaled
        } else {
            self.min_fuzzy_distance
        }
    }

    /// Classify `candidate` against `query`; `None` means no tier applies.
    pub fn tier(&self, candidate: &str, query: &str) -> Option<TierMatch> {
        let candidate_len = candidate.chars().count();
        let query_len = query.chars().count();
        let length_delta = candidate_len.abs_diff(query_len);

        let tier = if candidate == query {
            MatchTier::Exact
        } else if candidate.starts_with(query) {
            MatchTier::Prefix
        } else if candidate.contains(query) {
            MatchTier::Substring
        } else {
            let threshold = self.fuzzy_threshold(query_len);
            // Edit distance is at least the length difference.
            if length_delta > threshold
                || levenshtein::distance(candidate.chars(), query.chars()) > threshold
            {
                return None;
            }
            MatchTier::Fuzzy
        };

        Some(TierMatch { tier, length_delta })
    }
}
