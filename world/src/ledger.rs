//! Dense record of the cells consumed during the current session.

use popcorn_core::{classify::is_target, CellCoord, GridSize, LedgerView, TargetMode};

/// Set of consumed cells laid out as a dense grid.
///
/// Insertion is idempotent and the consumed count is tracked alongside the
/// cells so `len` never rescans the grid.
#[derive(Clone, Debug)]
pub struct ConsumptionLedger {
    grid_size: GridSize,
    cells: Vec<bool>,
    consumed: u64,
}

impl ConsumptionLedger {
    /// Creates an empty ledger sized for the provided grid.
    #[must_use]
    pub fn new(grid_size: GridSize) -> Self {
        let capacity = usize::try_from(grid_size.cell_count()).unwrap_or(0);
        Self {
            grid_size,
            cells: vec![false; capacity],
            consumed: 0,
        }
    }

    /// Clears every entry and re-lays the ledger out for `grid_size`.
    pub fn reset(&mut self, grid_size: GridSize) {
        let capacity = usize::try_from(grid_size.cell_count()).unwrap_or(0);
        self.grid_size = grid_size;
        self.cells.clear();
        self.cells.resize(capacity, false);
        self.consumed = 0;
    }

    /// Inserts the cell, returning `true` only when it was not already present.
    ///
    /// Cells outside the grid are never recorded.
    pub fn try_consume(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
        self.consumed = self.consumed.saturating_add(1);
        true
    }

    /// Reports whether the cell has been consumed.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of consumed cells.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.consumed
    }

    /// Reports whether nothing has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.consumed == 0
    }

    /// Borrows the ledger as a read-only view.
    #[must_use]
    pub fn view(&self) -> LedgerView<'_> {
        LedgerView::new(&self.cells, self.grid_size, self.consumed)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let size = self.grid_size.get();
        if cell.x() < size && cell.y() < size {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Counts the cells that are targets under `mode`.
///
/// Uses the same predicate as consumption so the completion threshold always
/// matches what can actually be eaten.
#[must_use]
pub fn count_eligible(grid_size: GridSize, mode: TargetMode) -> u64 {
    let size = grid_size.get();
    let mut count = 0;
    for x in 0..size {
        for y in 0..size {
            if is_target(x, y, mode) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::{count_eligible, ConsumptionLedger};
    use popcorn_core::{arithmetic::is_coprime, CellCoord, GridSize, TargetMode};
    use proptest::prelude::*;

    #[test]
    fn consuming_twice_is_a_no_op() {
        let mut ledger = ConsumptionLedger::new(GridSize::new(10));
        let cell = CellCoord::new(1, 1);

        assert!(ledger.try_consume(cell));
        assert!(!ledger.try_consume(cell));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(cell));
    }

    #[test]
    fn cells_outside_grid_are_ignored() {
        let mut ledger = ConsumptionLedger::new(GridSize::new(10));
        assert!(!ledger.try_consume(CellCoord::new(10, 0)));
        assert!(!ledger.contains(CellCoord::new(10, 0)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut ledger = ConsumptionLedger::new(GridSize::new(10));
        assert!(ledger.try_consume(CellCoord::new(9, 9)));

        ledger.reset(GridSize::new(20));
        assert!(ledger.is_empty());
        assert!(!ledger.contains(CellCoord::new(9, 9)));
        assert!(ledger.try_consume(CellCoord::new(19, 19)));
        assert_eq!(ledger.view().len(), 1);
        assert!(ledger.view().contains(CellCoord::new(19, 19)));
    }

    #[test]
    fn eligible_counts_match_hand_computed_totals() {
        assert_eq!(count_eligible(GridSize::new(1), TargetMode::Coprime), 0);
        assert_eq!(count_eligible(GridSize::new(1), TargetMode::NonCoprime), 1);
        assert_eq!(count_eligible(GridSize::new(2), TargetMode::Coprime), 3);
        assert_eq!(count_eligible(GridSize::new(2), TargetMode::NonCoprime), 1);
        assert_eq!(count_eligible(GridSize::new(10), TargetMode::Coprime), 57);
        assert_eq!(count_eligible(GridSize::new(10), TargetMode::NonCoprime), 43);
    }

    proptest! {
        #[test]
        fn eligible_count_partitions_grid(size in 1u32..40) {
            let grid = GridSize::new(size);
            let coprime = count_eligible(grid, TargetMode::Coprime);
            let inverted = count_eligible(grid, TargetMode::NonCoprime);
            prop_assert_eq!(coprime + inverted, grid.cell_count());
        }

        #[test]
        fn eligible_count_excludes_origin_unless_inverted(size in 1u32..40) {
            let grid = GridSize::new(size);
            let mut coprime_cells = 0;
            for x in 0..size {
                for y in 0..size {
                    if is_coprime(i64::from(x), i64::from(y)) {
                        coprime_cells += 1;
                    }
                }
            }
            prop_assert_eq!(count_eligible(grid, TargetMode::Coprime), coprime_cells);
            prop_assert_eq!(
                count_eligible(grid, TargetMode::NonCoprime),
                grid.cell_count() - coprime_cells,
            );
        }
    }
}
