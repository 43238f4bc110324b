#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Popcorn engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The number-theory kernel ([`arithmetic`]), the cell classifier
//! ([`classify`]) and the world/grid conversions ([`geometry`]) live here so
//! that the world, every system and the rendering adapters evaluate cells with
//! exactly the same predicates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod arithmetic;
pub mod classify;
pub mod geometry;

pub use arithmetic::RemappedPoint;
pub use geometry::{GridGeometry, WorldPosition, WORLD_LENGTH};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Popcorn.";

/// Distance the player covers per tick, in world units.
pub const PLAYER_SPEED: f32 = 4.0;

/// Fraction of a cell trimmed from each side of the player's cross-axis footprint
/// when probing for obstructions.
pub const COLLISION_MARGIN: f32 = 0.15;

/// Rule set deciding which cells are targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// Coprime cells are targets; non-coprime cells are walls.
    #[default]
    Coprime,
    /// Non-coprime cells (and the origin) are targets; coprime cells are walls.
    NonCoprime,
}

impl TargetMode {
    /// Reports whether the inverted rule set is active.
    #[must_use]
    pub const fn is_inverted(self) -> bool {
        matches!(self, Self::NonCoprime)
    }

    /// Returns the opposite rule set.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Coprime => Self::NonCoprime,
            Self::NonCoprime => Self::Coprime,
        }
    }

    /// Score change awarded for each consumed cell.
    ///
    /// The inverted rule set penalises consumption.
    #[must_use]
    pub const fn points_per_cell(self) -> i64 {
        match self {
            Self::Coprime => 1,
            Self::NonCoprime => -1,
        }
    }
}

/// Traversal rules applied to movement and consumption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalMode {
    /// Walls obstruct the player and cells are eaten in their regular layout.
    #[default]
    Grid,
    /// Nothing obstructs the player and targets sit at their remapped positions.
    Warp,
}

impl TraversalMode {
    /// Reports whether warp traversal is active.
    #[must_use]
    pub const fn is_warp(self) -> bool {
        matches!(self, Self::Warp)
    }

    /// Returns the opposite traversal mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::Warp,
            Self::Warp => Self::Grid,
        }
    }
}

/// Number of cells along each edge of the square grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a grid size, treating zero as a single cell.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    /// Retrieves the number of cells along each edge.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.0 as u64 * self.0 as u64
    }
}

/// Location of a single grid cell. `y` grows upward from the bottom row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the cell is the origin.
    #[must_use]
    pub const fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Discrete directions currently held by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeldDirections {
    /// Movement toward the top of the world.
    pub up: bool,
    /// Movement toward the bottom of the world.
    pub down: bool,
    /// Movement toward the left edge of the world.
    pub left: bool,
    /// Movement toward the right edge of the world.
    pub right: bool,
}

impl HeldDirections {
    /// No direction held.
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Reports whether any direction is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Analogue direction supplied by a touch joystick, in world axes (`y` down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JoystickVector {
    x: f32,
    y: f32,
}

impl JoystickVector {
    /// Creates a joystick vector clamped to unit length.
    ///
    /// Non-finite components collapse to zero.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        let sanitize = |value: f32| if value.is_finite() { value } else { 0.0 };
        let (x, y) = (sanitize(x), sanitize(y));
        let length = x.hypot(y);
        if length > 1.0 {
            Self {
                x: x / length,
                y: y / length,
            }
        } else {
            Self { x, y }
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component, positive toward the bottom of the world.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Input sampled once per tick.
///
/// When a joystick vector is present it replaces the held directions entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementInput {
    /// Discrete directions held on the keyboard.
    pub held: HeldDirections,
    /// Active touch joystick vector, if any.
    pub joystick: Option<JoystickVector>,
}

impl MovementInput {
    /// Creates input from held directions only.
    #[must_use]
    pub const fn from_held(held: HeldDirections) -> Self {
        Self {
            held,
            joystick: None,
        }
    }

    /// Creates input from a joystick vector only.
    #[must_use]
    pub const fn from_joystick(joystick: JoystickVector) -> Self {
        Self {
            held: HeldDirections::NONE,
            joystick: Some(joystick),
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh session with the provided grid and rule set.
    ConfigureSession {
        /// Number of cells along each grid edge.
        grid_size: GridSize,
        /// Rule set deciding which cells are targets.
        target_mode: TargetMode,
    },
    /// Starts a fresh session keeping the current grid and rule set.
    RestartSession,
    /// Flips between grid and warp traversal without resetting the session.
    ToggleWarp,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records the session start timestamp if none is recorded yet.
    StartTimer,
    /// Moves the player footprint to a new world position.
    MovePlayer {
        /// Destination of the footprint's top-left corner.
        to: WorldPosition,
    },
    /// Requests consumption of the provided cells.
    ConsumeCells {
        /// Cells the player overlapped during the current tick.
        cells: Vec<CellCoord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh session began.
    SessionReset {
        /// Number of cells along each grid edge.
        grid_size: GridSize,
        /// Rule set deciding which cells are targets.
        target_mode: TargetMode,
        /// Number of cells that must be consumed to finish.
        total_to_eat: u64,
    },
    /// Announces that the traversal mode changed.
    TraversalModeChanged {
        /// Mode that became active.
        mode: TraversalMode,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the session timer started.
    TimerStarted {
        /// Simulation clock reading recorded as the start timestamp.
        at: Duration,
    },
    /// Confirms that the player footprint moved.
    PlayerMoved {
        /// Position before the move.
        from: WorldPosition,
        /// Position after the move.
        to: WorldPosition,
    },
    /// Confirms that a cell was consumed for the first time this session.
    CellConsumed {
        /// Cell that entered the ledger.
        cell: CellCoord,
        /// Score after awarding the cell.
        score: i64,
    },
    /// Announces that every target was consumed.
    SessionFinished {
        /// Final score of the session.
        score: i64,
        /// Frozen elapsed time of the session.
        elapsed: Duration,
    },
}

/// Read-only snapshot of the session used by systems and adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Accumulated score; negative under the inverted rule set.
    pub score: i64,
    /// Number of cells along each grid edge.
    pub grid_size: GridSize,
    /// Active rule set.
    pub target_mode: TargetMode,
    /// Active traversal mode.
    pub traversal: TraversalMode,
    /// Whether every target has been consumed.
    pub finished: bool,
    /// Number of targets in the grid under the active rule set.
    pub total_to_eat: u64,
    /// Number of cells in the ledger.
    pub eaten_count: u64,
    /// Simulation clock reading at the first movement, if any.
    pub started_at: Option<Duration>,
    /// Time elapsed since the first movement, frozen once finished.
    pub elapsed: Duration,
    /// Top-left corner of the player footprint.
    pub player: WorldPosition,
}

impl SessionSnapshot {
    /// Completion percentage in `0.0..=100.0`.
    #[must_use]
    pub fn progress_percent(&self) -> f32 {
        let total = self.total_to_eat.max(1) as f32;
        (self.eaten_count as f32 / total * 100.0).min(100.0)
    }
}

/// Read-only view into the dense consumption ledger.
#[derive(Clone, Copy, Debug)]
pub struct LedgerView<'a> {
    cells: &'a [bool],
    grid_size: GridSize,
    consumed: u64,
}

impl<'a> LedgerView<'a> {
    /// Captures a new ledger view backed by the provided cell slice.
    #[must_use]
    pub const fn new(cells: &'a [bool], grid_size: GridSize, consumed: u64) -> Self {
        Self {
            cells,
            grid_size,
            consumed,
        }
    }

    /// Reports whether the cell has been consumed this session.
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

    /// Reports whether no cell has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.consumed == 0
    }

    /// Grid size the ledger was laid out for.
    #[must_use]
    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
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

/// Per-cell state exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellState {
    /// Cell being described.
    pub cell: CellCoord,
    /// Whether the cell awards a point under the active rule set.
    pub target: bool,
    /// Whether the cell has been consumed this session.
    pub consumed: bool,
    /// Warp-layout position, present only while warp traversal is active.
    pub remapped: Option<RemappedPoint>,
}
