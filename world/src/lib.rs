#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Popcorn.

mod ledger;
mod session;

use std::time::Duration;

use log::{debug, info};
use popcorn_core::{
    classify::is_target, CellCoord, Command, Event, GridGeometry, GridSize, TargetMode,
    TraversalMode, WorldPosition, WELCOME_BANNER,
};

pub use ledger::{count_eligible, ConsumptionLedger};

use self::session::Session;

/// Grid size used on initial load.
pub const DEFAULT_GRID_SIZE: GridSize = GridSize::new(200);

/// Represents the authoritative Popcorn world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    geometry: GridGeometry,
    session: Session,
    ledger: ConsumptionLedger,
    player: WorldPosition,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a new world holding a fresh session on the default grid.
    #[must_use]
    pub fn new() -> Self {
        let geometry = GridGeometry::with_default_world(DEFAULT_GRID_SIZE);
        let target_mode = TargetMode::Coprime;
        let total_to_eat = count_eligible(DEFAULT_GRID_SIZE, target_mode);
        Self {
            banner: WELCOME_BANNER,
            session: Session::new(
                DEFAULT_GRID_SIZE,
                target_mode,
                TraversalMode::Grid,
                total_to_eat,
            ),
            ledger: ConsumptionLedger::new(DEFAULT_GRID_SIZE),
            player: geometry.spawn_position(),
            geometry,
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn reset(&mut self, grid_size: GridSize, target_mode: TargetMode, out_events: &mut Vec<Event>) {
        self.geometry = GridGeometry::new(grid_size, self.geometry.world_length());
        self.ledger.reset(grid_size);
        self.player = self.geometry.spawn_position();

        let total_to_eat = count_eligible(grid_size, target_mode);
        self.session = Session::new(grid_size, target_mode, self.session.traversal, total_to_eat);
        info!(
            "session reset: {size}x{size} grid, {target_mode:?} rule, {total_to_eat} targets",
            size = grid_size.get(),
        );
        out_events.push(Event::SessionReset {
            grid_size,
            target_mode,
            total_to_eat,
        });

        if self.session.finished {
            out_events.push(Event::SessionFinished {
                score: self.session.score,
                elapsed: self.session.elapsed,
            });
        }
    }

    fn consume(&mut self, cells: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        if self.session.finished {
            return;
        }

        let target_mode = self.session.target_mode;
        let mut newly_consumed = 0;
        for cell in cells {
            if !is_target(cell.x(), cell.y(), target_mode) {
                continue;
            }
            if !self.ledger.try_consume(cell) {
                continue;
            }
            newly_consumed += 1;
            self.session.award(1);
            out_events.push(Event::CellConsumed {
                cell,
                score: self.session.score,
            });
        }

        if newly_consumed == 0 {
            return;
        }
        debug!(
            "consumed {newly_consumed} cell(s), {}/{} eaten",
            self.ledger.len(),
            self.session.total_to_eat
        );

        if self.session.settle(self.ledger.len()) {
            info!(
                "session finished: score {} in {:?}",
                self.session.score, self.session.elapsed
            );
            out_events.push(Event::SessionFinished {
                score: self.session.score,
                elapsed: self.session.elapsed,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession {
            grid_size,
            target_mode,
        } => world.reset(grid_size, target_mode, out_events),
        Command::RestartSession => {
            let grid_size = world.session.grid_size;
            let target_mode = world.session.target_mode;
            world.reset(grid_size, target_mode, out_events);
        }
        Command::ToggleWarp => {
            let mode = world.session.traversal.toggled();
            world.session.traversal = mode;
            info!("traversal mode changed to {mode:?}");
            out_events.push(Event::TraversalModeChanged { mode });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            world.session.advance_clock(world.clock);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StartTimer => {
            if world.session.start_timer(world.clock) {
                debug!("session timer started at {:?}", world.clock);
                out_events.push(Event::TimerStarted { at: world.clock });
            }
        }
        Command::MovePlayer { to } => {
            if world.session.finished {
                return;
            }
            let to = world.geometry.clamp(to);
            if to != world.player {
                let from = world.player;
                world.player = to;
                out_events.push(Event::PlayerMoved { from, to });
            }
        }
        Command::ConsumeCells { cells } => world.consume(cells, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use popcorn_core::{
        arithmetic::remap_position, classify, CellCoord, CellState, GridGeometry, LedgerView,
        SessionSnapshot, TargetMode, TraversalMode, WorldPosition,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the scale relationship between the grid and world space.
    #[must_use]
    pub fn geometry(world: &World) -> GridGeometry {
        world.geometry
    }

    /// Captures a read-only snapshot of the session.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        let session = &world.session;
        SessionSnapshot {
            score: session.score,
            grid_size: session.grid_size,
            target_mode: session.target_mode,
            traversal: session.traversal,
            finished: session.finished,
            total_to_eat: session.total_to_eat,
            eaten_count: world.ledger.len(),
            started_at: session.started_at,
            elapsed: session.elapsed,
            player: world.player,
        }
    }

    /// Exposes a read-only view of the consumption ledger.
    #[must_use]
    pub fn ledger_view(world: &World) -> LedgerView<'_> {
        world.ledger.view()
    }

    /// Current top-left corner of the player footprint.
    #[must_use]
    pub fn player_position(world: &World) -> WorldPosition {
        world.player
    }

    /// Active rule set.
    #[must_use]
    pub fn target_mode(world: &World) -> TargetMode {
        world.session.target_mode
    }

    /// Active traversal mode.
    #[must_use]
    pub fn traversal_mode(world: &World) -> TraversalMode {
        world.session.traversal
    }

    /// Reports whether grid cell `(x, y)` obstructs movement under the current rules.
    #[must_use]
    pub fn is_cell_blocked(world: &World, x: i64, y: i64) -> bool {
        let session = &world.session;
        classify::is_blocked(
            x,
            y,
            session.grid_size,
            session.target_mode,
            session.traversal,
        )
    }

    /// Total simulated time accumulated by ticks.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Enumerates every grid cell with its classification and consumption state.
    ///
    /// Remapped positions are only attached while warp traversal is active.
    pub fn cell_states(world: &World) -> impl Iterator<Item = CellState> + '_ {
        let session = &world.session;
        let grid_size = session.grid_size;
        let target_mode = session.target_mode;
        let warp = session.traversal.is_warp();
        let size = grid_size.get();

        (0..size).flat_map(move |x| {
            (0..size).map(move |y| {
                let cell = CellCoord::new(x, y);
                CellState {
                    cell,
                    target: classify::is_target(x, y, target_mode),
                    consumed: world.ledger.contains(cell),
                    remapped: warp.then(|| remap_position(x, y, grid_size)),
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(size: u32, target_mode: TargetMode) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureSession {
                grid_size: GridSize::new(size),
                target_mode,
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn new_world_starts_on_default_grid() {
        let world = World::new();
        let session = query::session(&world);
        assert_eq!(session.grid_size, DEFAULT_GRID_SIZE);
        assert_eq!(session.target_mode, TargetMode::Coprime);
        assert_eq!(session.total_to_eat, count_eligible(DEFAULT_GRID_SIZE, TargetMode::Coprime));
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(
            query::player_position(&world),
            query::geometry(&world).spawn_position()
        );
    }

    #[test]
    fn configure_session_announces_target_total() {
        let (world, events) = configured(10, TargetMode::NonCoprime);
        assert_eq!(
            events,
            vec![Event::SessionReset {
                grid_size: GridSize::new(10),
                target_mode: TargetMode::NonCoprime,
                total_to_eat: 43,
            }]
        );
        let session = query::session(&world);
        assert_eq!(session.total_to_eat, 43);
        assert!(!session.finished);
        assert_eq!(query::geometry(&world).cell_length(), 80.0);
    }

    #[test]
    fn consumption_ignores_non_targets_and_duplicates() {
        let (mut world, _) = configured(10, TargetMode::Coprime);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConsumeCells {
                cells: vec![
                    CellCoord::new(1, 1),
                    CellCoord::new(2, 4),
                    CellCoord::new(0, 0),
                    CellCoord::new(1, 1),
                    CellCoord::new(40, 1),
                ],
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CellConsumed {
                cell: CellCoord::new(1, 1),
                score: 1,
            }]
        );
        let session = query::session(&world);
        assert_eq!(session.eaten_count, 1);
        assert_eq!(session.score, 1);
    }

    #[test]
    fn inverted_consumption_decrements_score() {
        let (mut world, _) = configured(10, TargetMode::NonCoprime);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConsumeCells {
                cells: vec![CellCoord::new(0, 0), CellCoord::new(2, 4)],
            },
            &mut events,
        );
        assert_eq!(query::session(&world).score, -2);
        assert_eq!(query::session(&world).eaten_count, 2);
    }

    #[test]
    fn finishing_freezes_timer_and_movement() {
        let (mut world, _) = configured(2, TargetMode::Coprime);
        let mut events = Vec::new();
        apply(&mut world, Command::StartTimer, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ConsumeCells {
                cells: vec![
                    CellCoord::new(0, 1),
                    CellCoord::new(1, 0),
                    CellCoord::new(1, 1),
                ],
            },
            &mut events,
        );
        assert!(events.contains(&Event::SessionFinished {
            score: 3,
            elapsed: Duration::from_millis(250),
        }));

        let before = query::session(&world);
        let mut late_events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut late_events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                to: WorldPosition::new(400.0, 0.0),
            },
            &mut late_events,
        );
        let after = query::session(&world);

        assert!(after.finished);
        assert_eq!(after.elapsed, Duration::from_millis(250));
        assert_eq!(after.player, before.player);
        assert_eq!(late_events, vec![Event::TimeAdvanced { dt: Duration::from_secs(3) }]);
        assert!(after.started_at.is_some());
    }

    #[test]
    fn timer_starts_once() {
        let (mut world, _) = configured(10, TargetMode::Coprime);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        apply(&mut world, Command::StartTimer, &mut events);
        apply(&mut world, Command::StartTimer, &mut events);
        let starts = events
            .iter()
            .filter(|event| matches!(event, Event::TimerStarted { .. }))
            .count();
        assert_eq!(starts, 1);
        assert_eq!(
            query::session(&world).started_at,
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn toggling_warp_preserves_session() {
        let (mut world, _) = configured(10, TargetMode::Coprime);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConsumeCells {
                cells: vec![CellCoord::new(1, 0)],
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::ToggleWarp, &mut events);

        assert_eq!(
            events,
            vec![Event::TraversalModeChanged {
                mode: TraversalMode::Warp
            }]
        );
        let session = query::session(&world);
        assert_eq!(session.score, 1);
        assert_eq!(session.eaten_count, 1);
        assert!(!query::is_cell_blocked(&world, 2, 4));
    }

    #[test]
    fn restart_keeps_configuration_and_warp() {
        let (mut world, _) = configured(20, TargetMode::NonCoprime);
        let mut events = Vec::new();
        apply(&mut world, Command::ToggleWarp, &mut events);
        apply(
            &mut world,
            Command::ConsumeCells {
                cells: vec![CellCoord::new(2, 4)],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                to: WorldPosition::new(100.0, 100.0),
            },
            &mut events,
        );
        apply(&mut world, Command::RestartSession, &mut events);

        let session = query::session(&world);
        assert_eq!(session.grid_size, GridSize::new(20));
        assert_eq!(session.target_mode, TargetMode::NonCoprime);
        assert_eq!(session.traversal, TraversalMode::Warp);
        assert_eq!(session.score, 0);
        assert_eq!(session.eaten_count, 0);
        assert_eq!(session.started_at, None);
        assert_eq!(session.player, query::geometry(&world).spawn_position());
    }

    #[test]
    fn move_player_clamps_into_world() {
        let (mut world, _) = configured(10, TargetMode::Coprime);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                to: WorldPosition::new(-20.0, 9_000.0),
            },
            &mut events,
        );
        assert_eq!(query::player_position(&world), WorldPosition::new(0.0, 720.0));
        assert!(events.is_empty());
    }

    #[test]
    fn cell_states_attach_remapped_points_only_in_warp() {
        let (mut world, _) = configured(10, TargetMode::Coprime);
        assert!(query::cell_states(&world).all(|state| state.remapped.is_none()));
        assert_eq!(query::cell_states(&world).count(), 100);

        let mut events = Vec::new();
        apply(&mut world, Command::ToggleWarp, &mut events);
        let states: Vec<_> = query::cell_states(&world).collect();
        assert!(states.iter().all(|state| state.remapped.is_some()));
        let targets = states.iter().filter(|state| state.target).count() as u64;
        assert_eq!(targets, query::session(&world).total_to_eat);
    }

    #[test]
    fn single_cell_grid_is_finished_immediately_in_coprime_mode() {
        let (world, events) = configured(1, TargetMode::Coprime);
        assert!(query::session(&world).finished);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::SessionFinished { .. })));
    }

    #[test]
    fn ticks_advance_clock_and_index() {
        let mut world = World::new();
        let mut events = Vec::new();
        for _ in 0..3 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut events,
            );
        }
        assert_eq!(query::tick_index(&world), 3);
        assert_eq!(query::clock(&world), Duration::from_millis(48));
        assert_eq!(query::session(&world).elapsed, Duration::ZERO);
    }
}
