#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides which cells the player eats each tick.
//!
//! In grid traversal the player eats the single cell beneath the centre of
//! its footprint. In warp traversal every target is drawn at its remapped
//! position instead, and each one whose footprint overlaps the player is
//! eaten in the same tick.

use popcorn_core::{
    arithmetic::remap_position, classify::is_target, CellCoord, Command, Event, GridGeometry,
    LedgerView, SessionSnapshot,
};

/// Consumption system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct Consumption {
    scratch: Vec<CellCoord>,
}

impl Consumption {
    /// Creates a new consumption system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a [`Command::ConsumeCells`] for every newly overlapped target.
    ///
    /// The batch must contain a tick; finished sessions are ignored. Cells
    /// already in the ledger are never proposed again.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: &SessionSnapshot,
        geometry: GridGeometry,
        ledger: LedgerView<'_>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        if session.finished {
            return;
        }

        self.scratch.clear();
        if session.traversal.is_warp() {
            self.collect_remapped(session, geometry, ledger);
        } else if let Some(cell) = cell_beneath(session, geometry, ledger) {
            self.scratch.push(cell);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.push(Command::ConsumeCells {
            cells: self.scratch.clone(),
        });
    }

    fn collect_remapped(
        &mut self,
        session: &SessionSnapshot,
        geometry: GridGeometry,
        ledger: LedgerView<'_>,
    ) {
        let grid_size = session.grid_size;
        let size = grid_size.get();
        for x in 0..size {
            for y in 0..size {
                if !is_target(x, y, session.target_mode) {
                    continue;
                }
                let cell = CellCoord::new(x, y);
                if ledger.contains(cell) {
                    continue;
                }
                let origin = geometry.remapped_origin(remap_position(x, y, grid_size));
                if geometry.footprints_overlap(session.player, origin) {
                    self.scratch.push(cell);
                }
            }
        }
    }
}

fn cell_beneath(
    session: &SessionSnapshot,
    geometry: GridGeometry,
    ledger: LedgerView<'_>,
) -> Option<CellCoord> {
    let cell = geometry.cell_under_center(session.player)?;
    if !is_target(cell.x(), cell.y(), session.target_mode) || ledger.contains(cell) {
        return None;
    }
    Some(cell)
}
