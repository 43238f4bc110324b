//! Per-cell classification shared by collision, consumption and rendering.
//!
//! Cells are never materialised; both predicates evaluate a coordinate on
//! demand from the number-theory kernel.

use crate::{arithmetic::is_coprime, GridSize, TargetMode, TraversalMode};

/// Reports whether the cell at `(x, y)` awards a point when consumed.
///
/// Coprime cells are targets under [`TargetMode::Coprime`] and non-coprime
/// cells are targets under [`TargetMode::NonCoprime`]. The origin is a target
/// only in the non-coprime rule set.
#[must_use]
pub const fn is_target(x: u32, y: u32, mode: TargetMode) -> bool {
    if x == 0 && y == 0 {
        return mode.is_inverted();
    }

    let coprime = is_coprime(x as i64, y as i64);
    coprime != mode.is_inverted()
}

/// Reports whether the cell at grid coordinates `(x, y)` obstructs movement.
///
/// Warp traversal never blocks. Otherwise coordinates outside the grid are
/// blocked, the origin is always passable, and the remaining cells block
/// exactly when they are not targets under the active rule set.
#[must_use]
pub const fn is_blocked(
    x: i64,
    y: i64,
    grid_size: GridSize,
    mode: TargetMode,
    traversal: TraversalMode,
) -> bool {
    if traversal.is_warp() {
        return false;
    }

    let size = grid_size.get() as i64;
    if x < 0 || y < 0 || x >= size || y >= size {
        return true;
    }

    if x == 0 && y == 0 {
        return false;
    }

    let coprime = is_coprime(x, y);
    coprime == mode.is_inverted()
}
