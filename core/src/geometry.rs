//! Conversions between continuous world space and grid coordinates.
//!
//! World space has its origin at the top-left corner with `y` growing
//! downward, while grid rows follow the mathematical convention and grow
//! upward. Every row flip in the engine goes through
//! [`GridGeometry::world_row_to_grid_y`] or its inverse.

use serde::{Deserialize, Serialize};

use crate::{arithmetic::RemappedPoint, CellCoord, GridSize};

/// Side length of the square play area expressed in world units.
pub const WORLD_LENGTH: f32 = 800.0;

/// Continuous world-space coordinate of a cell-sized footprint's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    x: f32,
    y: f32,
}

impl WorldPosition {
    /// Creates a new world-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units, increasing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Scale relationship between a square grid and the world space it covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    grid_size: GridSize,
    world_length: f32,
}

impl GridGeometry {
    /// Creates a geometry spanning `world_length` units with `grid_size` cells per edge.
    #[must_use]
    pub const fn new(grid_size: GridSize, world_length: f32) -> Self {
        Self {
            grid_size,
            world_length,
        }
    }

    /// Creates a geometry covering the default [`WORLD_LENGTH`].
    #[must_use]
    pub const fn with_default_world(grid_size: GridSize) -> Self {
        Self::new(grid_size, WORLD_LENGTH)
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    /// Side length of the whole play area.
    #[must_use]
    pub const fn world_length(&self) -> f32 {
        self.world_length
    }

    /// Side length of a single cell.
    #[must_use]
    pub fn cell_length(&self) -> f32 {
        self.world_length / self.grid_size.get() as f32
    }

    /// Largest coordinate a cell-sized footprint may occupy on either axis.
    #[must_use]
    pub fn max_coordinate(&self) -> f32 {
        (self.world_length - self.cell_length()).max(0.0)
    }

    /// Column index containing the world-space `x` coordinate.
    ///
    /// The result may lie outside the grid.
    #[must_use]
    pub fn column_at(&self, x: f32) -> i64 {
        (x / self.cell_length()).floor() as i64
    }

    /// World row index (counted from the top) containing the world-space `y` coordinate.
    #[must_use]
    pub fn world_row_at(&self, y: f32) -> i64 {
        (y / self.cell_length()).floor() as i64
    }

    /// Converts a world row counted from the top into a grid `y` counted from the bottom.
    #[must_use]
    pub const fn world_row_to_grid_y(&self, row: i64) -> i64 {
        self.grid_size.get() as i64 - 1 - row
    }

    /// Converts a grid `y` counted from the bottom into a world row counted from the top.
    #[must_use]
    pub const fn grid_y_to_world_row(&self, y: i64) -> i64 {
        self.grid_size.get() as i64 - 1 - y
    }

    /// Grid cell containing the world-space point, if the point lies on the grid.
    #[must_use]
    pub fn cell_at(&self, x: f32, y: f32) -> Option<CellCoord> {
        let column = self.column_at(x);
        let grid_y = self.world_row_to_grid_y(self.world_row_at(y));
        let size = i64::from(self.grid_size.get());
        if column < 0 || grid_y < 0 || column >= size || grid_y >= size {
            return None;
        }
        Some(CellCoord::new(column as u32, grid_y as u32))
    }

    /// Grid cell containing the center of a footprint anchored at `position`.
    #[must_use]
    pub fn cell_under_center(&self, position: WorldPosition) -> Option<CellCoord> {
        let half = self.cell_length() * 0.5;
        self.cell_at(position.x() + half, position.y() + half)
    }

    /// Top-left world position of the grid cell in its regular layout.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> WorldPosition {
        let cell_length = self.cell_length();
        let row = self.grid_y_to_world_row(i64::from(cell.y()));
        WorldPosition::new(cell.x() as f32 * cell_length, row as f32 * cell_length)
    }

    /// Top-left world position of a remapped point in the warp layout.
    #[must_use]
    pub fn remapped_origin(&self, point: RemappedPoint) -> WorldPosition {
        let cell_length = self.cell_length();
        WorldPosition::new(
            point.x() * cell_length,
            self.world_length - (point.y() + 1.0) * cell_length,
        )
    }

    /// Position at which the player enters a fresh session: the origin cell.
    #[must_use]
    pub fn spawn_position(&self) -> WorldPosition {
        self.cell_origin(CellCoord::new(0, 0))
    }

    /// Clamps a footprint position into the playable bounds on both axes.
    #[must_use]
    pub fn clamp(&self, position: WorldPosition) -> WorldPosition {
        let max = self.max_coordinate();
        WorldPosition::new(position.x().clamp(0.0, max), position.y().clamp(0.0, max))
    }

    /// Reports whether two cell-sized footprints overlap with positive area.
    #[must_use]
    pub fn footprints_overlap(&self, first: WorldPosition, second: WorldPosition) -> bool {
        let size = self.cell_length();
        first.x() < second.x() + size
            && first.x() + size > second.x()
            && first.y() < second.y() + size
            && first.y() + size > second.y()
    }
}
