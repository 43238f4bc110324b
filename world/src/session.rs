//! Score, timer and completion bookkeeping for a single session.

use std::time::Duration;

use popcorn_core::{GridSize, TargetMode, TraversalMode};

#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) grid_size: GridSize,
    pub(crate) target_mode: TargetMode,
    pub(crate) traversal: TraversalMode,
    pub(crate) score: i64,
    pub(crate) total_to_eat: u64,
    pub(crate) started_at: Option<Duration>,
    pub(crate) elapsed: Duration,
    pub(crate) finished: bool,
}

impl Session {
    /// Creates a fresh session. Traversal mode is carried over by the caller.
    pub(crate) fn new(
        grid_size: GridSize,
        target_mode: TargetMode,
        traversal: TraversalMode,
        total_to_eat: u64,
    ) -> Self {
        Self {
            grid_size,
            target_mode,
            traversal,
            score: 0,
            total_to_eat,
            started_at: None,
            elapsed: Duration::ZERO,
            finished: total_to_eat == 0,
        }
    }

    pub(crate) fn start_timer(&mut self, now: Duration) -> bool {
        if self.finished || self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Recomputes the elapsed time unless the session already finished.
    pub(crate) fn advance_clock(&mut self, now: Duration) {
        if self.finished {
            return;
        }
        if let Some(start) = self.started_at {
            self.elapsed = now.saturating_sub(start);
        }
    }

    pub(crate) fn award(&mut self, cells: u64) {
        let points = i64::try_from(cells).unwrap_or(i64::MAX);
        self.score = self
            .score
            .saturating_add(points.saturating_mul(self.target_mode.points_per_cell()));
    }

    /// Marks the session finished once the ledger covers every target.
    ///
    /// Returns `true` only on the transition.
    pub(crate) fn settle(&mut self, eaten_count: u64) -> bool {
        if self.finished || eaten_count < self.total_to_eat {
            return false;
        }
        self.finished = true;
        true
    }
}
