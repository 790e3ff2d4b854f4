//! Background refresh of the published corpus.
//!
//! The worker polls the configured sources on an interval, and only decodes and
//! reloads when their content fingerprint changes. Any failure is logged and the
//! previously published corpus stays in place.

use crate::source::{self, LoadedSources};
use crate::state::{ReloadSummary, SearchEngine};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Source content is unchanged since the last successful reload.
    Unchanged,
    /// A new corpus was published.
    Reloaded(ReloadSummary),
}

/// Polls payload sources and reloads the engine when they change.
pub struct RefreshWorker {
    engine: Arc<SearchEngine>,
    sources: Vec<PathBuf>,
    last_fingerprint: Option<u64>,
}

impl RefreshWorker {
    pub fn new(engine: Arc<SearchEngine>, sources: Vec<PathBuf>) -> Self {
        Self {
            engine,
            sources,
            last_fingerprint: None,
        }
    }

    /// Record that the engine already holds the corpus for `loaded`.
    pub fn with_loaded(mut self, loaded: &LoadedSources) -> Self {
        self.last_fingerprint = Some(loaded.fingerprint);
        self
    }

    /// Perform one cycle: read, compare fingerprints, decode and reload if needed.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        let raw = source::read_sources(&self.sources).await?;
        let fingerprint = raw.fingerprint();
        if self.last_fingerprint == Some(fingerprint) {
            tracing::trace!("Sources unchanged ({:016x})", fingerprint);
            return Ok(RefreshOutcome::Unchanged);
        }

        let loaded = raw.decode()?;
        let summary = self.engine.reload(loaded.libraries)?;
        self.last_fingerprint = Some(fingerprint);
        Ok(RefreshOutcome::Reloaded(summary))
    }

    /// Run until `cancel` fires, refreshing every `period`.
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Refresh worker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.refresh().await {
                        Ok(RefreshOutcome::Reloaded(summary)) => {
                            tracing::info!("Sources changed, now serving generation {}", summary.generation);
                        }
                        Ok(RefreshOutcome::Unchanged) => {}
                        Err(e) => {
                            tracing::warn!("Refresh failed, keeping generation {}: {:#}", self.engine.generation(), e);
                        }
                    }
                }
            }
        }
    }
}

/// Spawn a refresh worker as a tokio task.
pub fn spawn_refresh_worker(
    worker: RefreshWorker,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(worker.run(period, cancel))
}
