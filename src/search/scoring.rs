//! Search relevance and ranking.
//!
//! A score is a tier weight minus a small penalty. Config validation keeps the
//! largest possible penalty below half of every gap between tier weights, so the
//! penalty only orders results within one tier, even for averaged scores.

use super::matching::{MatchTier, TierMatch};
use crate::config::ScoringConfig;

/// Segment markers that suggest a non-canonical, internal location.
const INTERNAL_MARKERS: &[&str] = &["_core", "_private", "_internal", "internal", "private", "__"];

/// How an item matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub name: Option<TierMatch>,
    pub types: Option<TierMatch>,
}

/// Computes final scores from match outcomes.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: ScoringConfig,
}

impl Ranker {
    pub const fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Within-tier penalty for a length difference between candidate and fragment.
    pub fn length_penalty(&self, length_delta: usize) -> u32 {
        u32::try_from(length_delta)
            .unwrap_or(u32::MAX)
            .min(self.config.max_length_penalty)
    }

    /// Penalty for deep or internal-looking qualified paths.
    ///
    /// Scoring:
    /// - `path_depth_penalty` per additional path segment (beyond the first)
    /// - `internal_path_penalty` per segment with an internal marker (_private, __, etc.)
    /// - capped at `max_path_penalty`
    pub fn path_penalty(&self, qualified_path: &str) -> u32 {
        let mut depth = 0u32;
        let mut internal = 0u32;
        for (i, segment) in qualified_path.split("::").enumerate() {
            if i > 0 {
                depth += 1;
            }
            if INTERNAL_MARKERS.iter().any(|marker| segment.contains(marker)) {
                internal += 1;
            }
        }

        let penalty = depth
            .saturating_mul(self.config.path_depth_penalty)
            .saturating_add(internal.saturating_mul(self.config.internal_path_penalty));
        penalty.min(self.config.max_path_penalty)
    }

    /// Final score for an item, or `None` when neither name nor type matched.
    ///
    /// - Name only: tier weight of the name match.
    /// - Types only: tier weight of the (worst) type match.
    /// - Both: floor of the average of the two tier weights.
    ///
    /// The length penalty follows the name match when there is one, else the type match.
    pub fn score(&self, outcome: &MatchOutcome, qualified_path: &str) -> Option<u32> {
        let (base, length_delta) = match (outcome.name, outcome.types) {
            (Some(name), Some(types)) => (
                floored_mean(self.weight(name.tier), self.weight(types.tier)),
                name.length_delta,
            ),
            (Some(only), None) | (None, Some(only)) => (self.weight(only.tier), only.length_delta),
            (None, None) => return None,
        };

        let penalty = self
            .length_penalty(length_delta)
            .saturating_add(self.path_penalty(qualified_path));
        Some(base.saturating_sub(penalty))
    }

    const fn weight(&self, tier: MatchTier) -> u32 {
        self.config.tier_weight(tier)
    }
}

/// `floor((a + b) / 2)` without overflowing.
const fn floored_mean(a: u32, b: u32) -> u32 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}
