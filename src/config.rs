//! TOML configuration for the engine and the server.
//!
//! Every field has a default, so an empty file (or no file at all) yields a working
//! configuration. Validation guarantees that within-tier penalties can never reorder
//! match tiers, including the halved gaps of combined name and type scores.

use crate::search::MatchTier;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default scan budget: the maximum number of corpus entries examined per query.
pub const DEFAULT_SCAN_BUDGET: usize = 1_000_000;

/// File name looked up under the user's config directory.
const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "rustdoc-search";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub matching: MatchingConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

/// Tier weights and within-tier penalties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weights for exact, prefix, substring and fuzzy matches.
    pub tier_weights: [u32; 4],
    pub max_length_penalty: u32,
    /// Penalty per qualified-path segment beyond the first.
    pub path_depth_penalty: u32,
    /// Penalty per path segment that looks internal (`__`, `_private`, ...).
    pub internal_path_penalty: u32,
    pub max_path_penalty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tier_weights: [1000, 750, 500, 250],
            max_length_penalty: 80,
            path_depth_penalty: 10,
            internal_path_penalty: 20,
            max_path_penalty: 40,
        }
    }
}

impl ScoringConfig {
    pub const fn tier_weight(&self, tier: MatchTier) -> u32 {
        self.tier_weights[tier as usize]
    }

    /// Largest total penalty any result can receive, saturating on overflow.
    pub const fn max_penalty(&self) -> u32 {
        self.max_length_penalty.saturating_add(self.max_path_penalty)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let Some(max_penalty) = self.max_length_penalty.checked_add(self.max_path_penalty) else {
            return Err(ConfigError::Invalid(format!(
                "max_length_penalty ({}) plus max_path_penalty ({}) overflows",
                self.max_length_penalty, self.max_path_penalty
            )));
        };
        // A combined name and type score averages two weights, so adjacent name
        // tiers under the same type tier are only half a gap apart.
        for pair in self.tier_weights.windows(2) {
            if pair[0] <= pair[1] || (pair[0] - pair[1]) / 2 <= max_penalty {
                return Err(ConfigError::Invalid(format!(
                    "tier weights {:?} must strictly decrease by more than twice the maximum penalty ({})",
                    self.tier_weights, max_penalty
                )));
            }
        }
        if self.tier_weights[3] <= max_penalty {
            return Err(ConfigError::Invalid(format!(
                "lowest tier weight {} must exceed the maximum penalty ({})",
                self.tier_weights[3], max_penalty
            )));
        }
        Ok(())
    }
}

/// Fuzzy matching threshold: `max(min_fuzzy_distance, len(query) / fuzzy_divisor)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    pub fuzzy_divisor: usize,
    pub min_fuzzy_distance: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_divisor: 4,
            min_fuzzy_distance: 1,
        }
    }
}

/// Query-time limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub default_limit: usize,
    /// Maximum entries examined per query; `0` disables the budget.
    pub scan_budget: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            scan_budget: DEFAULT_SCAN_BUDGET,
        }
    }
}

impl SearchConfig {
    pub const fn scan_budget(&self) -> Option<usize> {
        if self.scan_budget == 0 {
            None
        } else {
            Some(self.scan_budget)
        }
    }
}

/// Payload sources and refresh policy for the long-running server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub sources: Vec<PathBuf>,
    /// Seconds between source polls; `0` disables background refresh.
    pub refresh_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            refresh_interval_secs: 5,
        }
    }
}

impl ServerConfig {
    pub const fn refresh_interval(&self) -> Option<Duration> {
        if self.refresh_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.refresh_interval_secs))
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from an explicit path, else the user config file if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.is_file()),
        };

        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                let config =
                    Self::from_toml(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
                tracing::debug!("Loaded configuration from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        if self.matching.fuzzy_divisor == 0 {
            return Err(ConfigError::Invalid(
                "matching.fuzzy_divisor must be at least 1".to_string(),
            ));
        }
        if self.search.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "search.default_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/rustdoc-search/config.toml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
