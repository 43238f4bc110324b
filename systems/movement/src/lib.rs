#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that integrates player input and resolves
//! collisions against the grid classifier.
//!
//! Grid traversal resolves each axis separately, X first and then Y using the
//! already-resolved X, so an obstruction on one axis never halts motion on the
//! other. Warp traversal only clamps the player into the world bounds.

use popcorn_core::{
    Command, Event, GridGeometry, MovementInput, SessionSnapshot, WorldPosition,
    COLLISION_MARGIN, PLAYER_SPEED,
};

/// Distance trimmed from a leading edge so a footprint that exactly touches a
/// cell boundary does not probe the next cell.
const EDGE_EPSILON: f32 = 0.01;

/// Per-tick displacement requested by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    dx: f32,
    dy: f32,
}

impl Velocity {
    /// Creates a velocity from world-space components.
    #[must_use]
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> f32 {
        self.dx
    }

    /// Vertical component, positive toward the bottom of the world.
    #[must_use]
    pub const fn dy(&self) -> f32 {
        self.dy
    }

    /// Reports whether the velocity requests no movement.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Length of the velocity vector.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

/// Pure system that reacts to ticks and emits player movement commands.
#[derive(Clone, Debug)]
pub struct Movement {
    speed: f32,
    margin: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            margin: COLLISION_MARGIN,
        }
    }
}

impl Movement {
    /// Creates a movement system with an explicit per-tick speed.
    #[must_use]
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Consumes world events and the session snapshot to emit movement commands.
    ///
    /// Nothing is emitted unless the batch contains a tick. A non-zero velocity
    /// requests the session timer before any move, even when the move itself
    /// is fully obstructed.
    pub fn handle<F>(
        &self,
        events: &[Event],
        session: &SessionSnapshot,
        geometry: GridGeometry,
        input: MovementInput,
        is_cell_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(i64, i64) -> bool,
    {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        if session.finished {
            return;
        }

        let velocity = desired_velocity(input, self.speed);
        if velocity.is_zero() {
            return;
        }

        if session.started_at.is_none() {
            out.push(Command::StartTimer);
        }

        let current = session.player;
        let next = if session.traversal.is_warp() {
            resolve_warp(current, velocity, geometry)
        } else {
            resolve_sliding(current, velocity, geometry, self.margin, is_cell_blocked)
        };

        if next != current {
            out.push(Command::MovePlayer { to: next });
        }
    }
}

/// Converts sampled input into a per-tick velocity.
///
/// A joystick vector replaces the held directions. When both axes are active
/// the vector is rescaled to `speed` so diagonals are not faster; a single
/// axis never exceeds `speed`.
#[must_use]
pub fn desired_velocity(input: MovementInput, speed: f32) -> Velocity {
    let (mut dx, mut dy) = match input.joystick {
        Some(joystick) => (joystick.x() * speed, joystick.y() * speed),
        None => {
            let held = input.held;
            let mut dx = 0.0;
            let mut dy = 0.0;
            if held.up {
                dy -= speed;
            }
            if held.down {
                dy += speed;
            }
            if held.left {
                dx -= speed;
            }
            if held.right {
                dx += speed;
            }
            (dx, dy)
        }
    };

    let magnitude = dx.hypot(dy);
    if magnitude > speed || (dx != 0.0 && dy != 0.0) {
        dx = dx / magnitude * speed;
        dy = dy / magnitude * speed;
    }

    Velocity::new(dx, dy)
}

/// Moves freely and clamps the footprint into the playable bounds.
#[must_use]
pub fn resolve_warp(
    position: WorldPosition,
    velocity: Velocity,
    geometry: GridGeometry,
) -> WorldPosition {
    geometry.clamp(WorldPosition::new(
        position.x() + velocity.dx(),
        position.y() + velocity.dy(),
    ))
}

/// Resolves a move against blocked cells, sliding along unobstructed axes.
///
/// `margin` is the fraction of a cell trimmed from both sides of the
/// cross-axis footprint. A blocked probe snaps the footprint flush against the
/// obstructing cell; an unobstructed probe is accepted only inside the world.
#[must_use]
pub fn resolve_sliding<F>(
    position: WorldPosition,
    velocity: Velocity,
    geometry: GridGeometry,
    margin: f32,
    is_cell_blocked: F,
) -> WorldPosition
where
    F: Fn(i64, i64) -> bool,
{
    let cell_length = geometry.cell_length();
    let inset = cell_length * margin;
    let max = geometry.max_coordinate();

    let mut x = position.x();
    if velocity.dx() != 0.0 {
        let next = x + velocity.dx();
        let leading = if velocity.dx() > 0.0 {
            next + cell_length - EDGE_EPSILON
        } else {
            next
        };
        let column = geometry.column_at(leading);
        let first_row = geometry.world_row_at(position.y() + inset);
        let last_row = geometry.world_row_at(position.y() + cell_length - inset - EDGE_EPSILON);

        let blocked = (first_row..=last_row)
            .any(|row| is_cell_blocked(column, geometry.world_row_to_grid_y(row)));
        if blocked {
            x = flush_against(column, velocity.dx(), cell_length);
        } else if (0.0..=max).contains(&next) {
            x = next;
        }
    }

    let mut y = position.y();
    if velocity.dy() != 0.0 {
        let next = y + velocity.dy();
        let leading = if velocity.dy() > 0.0 {
            next + cell_length - EDGE_EPSILON
        } else {
            next
        };
        let row = geometry.world_row_at(leading);
        let grid_y = geometry.world_row_to_grid_y(row);
        let first_column = geometry.column_at(x + inset);
        let last_column = geometry.column_at(x + cell_length - inset - EDGE_EPSILON);

        let blocked = (first_column..=last_column).any(|column| is_cell_blocked(column, grid_y));
        if blocked {
            y = flush_against(row, velocity.dy(), cell_length);
        } else if (0.0..=max).contains(&next) {
            y = next;
        }
    }

    WorldPosition::new(x, y)
}

/// Coordinate that places the footprint edge-to-edge with the blocking cell.
fn flush_against(blocking_index: i64, direction: f32, cell_length: f32) -> f32 {
    if direction > 0.0 {
        (blocking_index - 1) as f32 * cell_length
    } else {
        (blocking_index + 1) as f32 * cell_length
    }
}
