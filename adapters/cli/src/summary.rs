//! End-of-run report printed to stdout.

use std::fmt;

use popcorn_core::SessionSnapshot;
use popcorn_rendering::format_elapsed;
use serde::Serialize;

use crate::{config::RunConfig, pilot::PilotKind, simulation::RunStats};

/// Final state of a run in a serialisable form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    grid_size: u32,
    rule: &'static str,
    warp: bool,
    theme: &'static str,
    pilot: PilotKind,
    seed: u64,
    frames: u64,
    sessions: u32,
    cells_consumed: u64,
    score: i64,
    eaten: u64,
    total: u64,
    progress_percent: f32,
    elapsed: String,
    elapsed_ms: u64,
    finished: bool,
    finished_on_frame: Option<u64>,
}

impl RunSummary {
    pub(crate) fn new(session: &SessionSnapshot, stats: RunStats, config: &RunConfig) -> Self {
        Self {
            grid_size: session.grid_size.get(),
            rule: if session.target_mode.is_inverted() {
                "non-coprime"
            } else {
                "coprime"
            },
            warp: session.traversal.is_warp(),
            theme: config.theme.theme().name,
            pilot: config.pilot,
            seed: config.seed,
            frames: stats.frames,
            sessions: stats.sessions,
            cells_consumed: stats.cells_consumed,
            score: session.score,
            eaten: session.eaten_count,
            total: session.total_to_eat,
            progress_percent: session.progress_percent(),
            elapsed: format_elapsed(session.elapsed),
            elapsed_ms: u64::try_from(session.elapsed.as_millis()).unwrap_or(u64::MAX),
            finished: session.finished,
            finished_on_frame: stats.finished_on_frame,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "grid {size}x{size} ({rule}{warp}), theme {theme}",
            size = self.grid_size,
            rule = self.rule,
            warp = if self.warp { ", warp" } else { "" },
            theme = self.theme,
        )?;
        writeln!(
            f,
            "score {}  eaten {}/{} ({:.0}%)  time {}",
            self.score, self.eaten, self.total, self.progress_percent.floor(), self.elapsed
        )?;
        match self.finished_on_frame {
            Some(frame) => write!(f, "board cleared on frame {frame} of {}", self.frames),
            None if self.finished => write!(f, "board was empty from the start"),
            None => write!(f, "board not cleared after {} frames", self.frames),
        }
    }
}
