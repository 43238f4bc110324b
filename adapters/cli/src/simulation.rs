//! Frame-by-frame wiring of the world and its systems.

use std::time::Duration;

use log::{debug, info};
use popcorn_core::{Command, Event, GridGeometry, SessionSnapshot};
use popcorn_rendering::{FrameInput, RenderingError, Scene};
use popcorn_system_consumption::Consumption;
use popcorn_system_movement::Movement;
use popcorn_world::{self as world, query, World};

use crate::config::RunConfig;

/// Running tallies of what happened during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunStats {
    pub(crate) frames: u64,
    pub(crate) sessions: u32,
    pub(crate) cells_consumed: u64,
    pub(crate) finished_on_frame: Option<u64>,
}

/// Owns the world and drives it one frame at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    consumption: Consumption,
    pending_events: Vec<Event>,
    frame_events: Vec<Event>,
    commands: Vec<Command>,
    stats: RunStats,
}

impl Simulation {
    /// Creates a world configured for `config`.
    pub(crate) fn new(config: &RunConfig) -> Self {
        let mut simulation = Self {
            world: World::new(),
            movement: Movement::default(),
            consumption: Consumption::new(),
            pending_events: Vec::new(),
            frame_events: Vec::new(),
            commands: Vec::new(),
            stats: RunStats::default(),
        };

        simulation.submit(Command::ConfigureSession {
            grid_size: config.grid_size,
            target_mode: config.target_mode,
        });
        if config.warp {
            simulation.submit(Command::ToggleWarp);
        }
        simulation.record_pending();
        simulation
    }

    /// Advances the simulation by one frame.
    ///
    /// Frame controls apply first, then the clock ticks, movement settles and
    /// consumption runs against the settled position.
    pub(crate) fn step(&mut self, dt: Duration, input: FrameInput) {
        self.stats.frames = self.stats.frames.saturating_add(1);
        self.apply_frame_controls(input);

        self.frame_events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.frame_events);

        let session = query::session(&self.world);
        let world = &self.world;
        self.movement.handle(
            &self.frame_events,
            &session,
            query::geometry(world),
            input.movement(),
            |x, y| query::is_cell_blocked(world, x, y),
            &mut self.commands,
        );
        self.flush_commands();

        self.consumption.handle(
            &self.frame_events,
            &query::session(&self.world),
            query::geometry(&self.world),
            query::ledger_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.pending_events.append(&mut self.frame_events);
        self.record_pending();
    }

    /// Repopulates `scene` from the current world state.
    pub(crate) fn populate(&self, scene: &mut Scene) -> Result<(), RenderingError> {
        scene.refresh(
            &query::session(&self.world),
            query::geometry(&self.world),
            query::cell_states(&self.world),
        )
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        query::session(&self.world)
    }

    pub(crate) fn geometry(&self) -> GridGeometry {
        query::geometry(&self.world)
    }

    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    pub(crate) fn stats(&self) -> RunStats {
        self.stats
    }

    fn apply_frame_controls(&mut self, input: FrameInput) {
        let session = query::session(&self.world);
        if let Some(grid_size) = input.grid_size {
            self.submit(Command::ConfigureSession {
                grid_size,
                target_mode: session.target_mode,
            });
        } else if input.toggle_inverted {
            self.submit(Command::ConfigureSession {
                grid_size: session.grid_size,
                target_mode: session.target_mode.toggled(),
            });
        } else if input.restart {
            self.submit(Command::RestartSession);
        }

        if input.toggle_warp {
            self.submit(Command::ToggleWarp);
        }
    }

    fn submit(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.pending_events);
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.frame_events);
        }
    }

    fn record_pending(&mut self) {
        for event in self.pending_events.drain(..) {
            match event {
                Event::SessionReset { .. } => {
                    self.stats.sessions = self.stats.sessions.saturating_add(1);
                    self.stats.finished_on_frame = None;
                }
                Event::CellConsumed { cell, score } => {
                    self.stats.cells_consumed = self.stats.cells_consumed.saturating_add(1);
                    debug!("ate ({}, {}), score {score}", cell.x(), cell.y());
                }
                Event::SessionFinished { score, elapsed } => {
                    self.stats.finished_on_frame = Some(self.stats.frames);
                    info!(
                        "cleared the board on frame {} with score {score} in {elapsed:?}",
                        self.stats.frames
                    );
                }
                Event::TraversalModeChanged { .. }
                | Event::TimeAdvanced { .. }
                | Event::TimerStarted { .. }
                | Event::PlayerMoved { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pilot::PilotKind;
    use popcorn_core::{GridSize, HeldDirections, TargetMode, TraversalMode};
    use popcorn_rendering::ThemeKey;

    fn config(grid: u32, target_mode: TargetMode, warp: bool) -> RunConfig {
        RunConfig {
            grid_size: GridSize::new(grid),
            target_mode,
            warp,
            theme: ThemeKey::Modern,
            frames: 100,
            frame_dt: Duration::from_millis(16),
            seed: 1,
            pilot: PilotKind::Idle,
            json: false,
        }
    }

    fn hold(held: HeldDirections) -> FrameInput {
        FrameInput {
            held,
            ..FrameInput::default()
        }
    }

    #[test]
    fn configuration_is_applied_on_creation() {
        let simulation = Simulation::new(&config(30, TargetMode::NonCoprime, true));
        let session = simulation.snapshot();
        assert_eq!(session.grid_size, GridSize::new(30));
        assert_eq!(session.target_mode, TargetMode::NonCoprime);
        assert_eq!(session.traversal, TraversalMode::Warp);
        assert_eq!(simulation.stats().sessions, 1);
        assert_eq!(simulation.banner(), popcorn_core::WELCOME_BANNER);
    }

    #[test]
    fn inverted_spawn_is_eaten_on_first_frame() {
        let mut simulation = Simulation::new(&config(10, TargetMode::NonCoprime, false));
        simulation.step(Duration::from_millis(16), FrameInput::default());
        assert_eq!(simulation.snapshot().score, -1);
        assert_eq!(simulation.stats().cells_consumed, 1);
    }

    #[test]
    fn frame_controls_reset_and_toggle() {
        let mut simulation = Simulation::new(&config(10, TargetMode::Coprime, false));
        let right = HeldDirections {
            right: true,
            ..HeldDirections::NONE
        };
        for _ in 0..20 {
            simulation.step(Duration::from_millis(16), hold(right));
        }
        assert!(simulation.snapshot().score > 0);

        simulation.step(
            Duration::from_millis(16),
            FrameInput {
                toggle_inverted: true,
                toggle_warp: true,
                ..FrameInput::default()
            },
        );
        let session = simulation.snapshot();
        assert_eq!(session.target_mode, TargetMode::NonCoprime);
        assert_eq!(session.traversal, TraversalMode::Warp);
        assert_eq!(session.player, simulation.geometry().spawn_position());
        assert_eq!(simulation.stats().sessions, 2);

        simulation.step(
            Duration::from_millis(16),
            FrameInput {
                grid_size: Some(GridSize::new(20)),
                ..FrameInput::default()
            },
        );
        assert_eq!(simulation.snapshot().grid_size, GridSize::new(20));
        assert_eq!(simulation.snapshot().target_mode, TargetMode::NonCoprime);

        simulation.step(
            Duration::from_millis(16),
            FrameInput {
                restart: true,
                ..FrameInput::default()
            },
        );
        assert_eq!(simulation.stats().sessions, 4);
    }

    #[test]
    fn populate_fills_every_cell() {
        let simulation = Simulation::new(&config(10, TargetMode::Coprime, false));
        let mut scene = Scene::new(simulation.geometry(), ThemeKey::Emerald).expect("valid board");
        simulation.populate(&mut scene).expect("valid board");
        assert_eq!(scene.cells.len(), 100);
        assert_eq!(scene.hud.total, 57);
        assert_eq!(scene.hud.rule_label, "COPRIME");
    }

    #[test]
    fn identical_inputs_replay_identically() {
        let run = || {
            let mut simulation = Simulation::new(&config(20, TargetMode::Coprime, false));
            let script = [
                HeldDirections {
                    right: true,
                    ..HeldDirections::NONE
                },
                HeldDirections {
                    up: true,
                    right: true,
                    ..HeldDirections::NONE
                },
                HeldDirections {
                    up: true,
                    ..HeldDirections::NONE
                },
            ];
            for held in script {
                for _ in 0..40 {
                    simulation.step(Duration::from_millis(16), hold(held));
                }
            }
            (simulation.snapshot(), simulation.stats())
        };

        assert_eq!(run(), run());
    }
}
