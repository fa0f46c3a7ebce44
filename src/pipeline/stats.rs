//! Pipeline-wide statistics helpers.
//!
//! This module defines the [`PipelineStats`] structure used to track how
//! many classification episodes and selections the pipeline has processed.
//! The counters are observability only; no pipeline behavior depends on
//! them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters accumulated over the life of a pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    episodes_started: AtomicU64,
    episodes_completed: AtomicU64,
    episodes_failed: AtomicU64,
    episodes_superseded: AtomicU64,
    selections_superseded: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_episode_started(&self) {
        self.episodes_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_episode_completed(&self) {
        self.episodes_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_episode_failed(&self) {
        self.episodes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_episode_superseded(&self) {
        self.episodes_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_selection_superseded(&self) {
        self.selections_superseded.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            episodes_started: self.episodes_started.load(Ordering::Relaxed),
            episodes_completed: self.episodes_completed.load(Ordering::Relaxed),
            episodes_failed: self.episodes_failed.load(Ordering::Relaxed),
            episodes_superseded: self.episodes_superseded.load(Ordering::Relaxed),
            selections_superseded: self.selections_superseded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Episodes that entered the classifying state.
    pub episodes_started: u64,
    /// Episodes that committed results.
    pub episodes_completed: u64,
    /// Episodes that surfaced an error.
    pub episodes_failed: u64,
    /// Episodes whose results were discarded as stale.
    pub episodes_superseded: u64,
    /// Image selections dropped by a newer in-flight request.
    pub selections_superseded: u64,
}
