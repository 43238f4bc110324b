//! Autopilots that stand in for a human player during headless runs.

use clap::ValueEnum;
use glam::Vec2;
use popcorn_core::{HeldDirections, JoystickVector};
use popcorn_rendering::{apply_key, FrameInput, Scene};
use popcorn_rendering_headless::InputSource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Frames a sweeping pilot waits for progress before giving up on a waypoint.
const STALL_FRAMES: u32 = 30;
/// Shortest and longest stretch a wandering pilot holds one direction.
const WANDER_HOLD: std::ops::RangeInclusive<u32> = 8..=48;
/// Keys a wandering pilot presses, in both keyboard layouts.
const WANDER_KEYS: [&str; 8] = [
    "w",
    "s",
    "a",
    "d",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
];

/// Selects how the autopilot produces input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PilotKind {
    /// Never moves; the timer never starts.
    Idle,
    /// Seeded random walk that presses up to two movement keys at a time.
    #[default]
    Wander,
    /// Serpentine sweep over the board, row by row from the bottom.
    Sweep,
}

/// Input source driven by a [`PilotKind`].
#[derive(Debug)]
pub(crate) struct Pilot {
    kind: PilotKind,
    rng: ChaCha8Rng,
    held: HeldDirections,
    hold_remaining: u32,
    waypoint: usize,
    last_origin: Option<Vec2>,
    stalled_frames: u32,
}

impl Pilot {
    pub(crate) fn new(kind: PilotKind, seed: u64) -> Self {
        Self {
            kind,
            rng: ChaCha8Rng::seed_from_u64(seed),
            held: HeldDirections::NONE,
            hold_remaining: 0,
            waypoint: 0,
            last_origin: None,
            stalled_frames: 0,
        }
    }

    fn wander(&mut self) -> HeldDirections {
        if self.hold_remaining == 0 {
            self.hold_remaining = self.rng.gen_range(WANDER_HOLD);
            for key in WANDER_KEYS {
                let _ = apply_key(&mut self.held, key, false);
            }
            for _ in 0..self.rng.gen_range(0..=2_u32) {
                let key = WANDER_KEYS[self.rng.gen_range(0..WANDER_KEYS.len())];
                let _ = apply_key(&mut self.held, key, true);
            }
        }
        self.hold_remaining -= 1;
        self.held
    }

    fn sweep(&mut self, scene: &Scene) -> Option<JoystickVector> {
        let cell = scene.grid.cell_length();
        let cells = scene.grid.cells_per_side as usize;
        if cells == 0 {
            return None;
        }

        let origin = scene.player.origin;
        if self.last_origin == Some(origin) {
            self.stalled_frames += 1;
        } else {
            self.stalled_frames = 0;
        }
        self.last_origin = Some(origin);

        let waypoints = cells * 2;
        for _ in 0..waypoints {
            let target = sweep_waypoint(self.waypoint % waypoints, cells, cell);
            let offset = target - origin;
            if offset.length() > 1.0 && self.stalled_frames < STALL_FRAMES {
                let direction = offset.normalize_or_zero();
                return Some(JoystickVector::new(direction.x, direction.y));
            }
            self.waypoint = self.waypoint.wrapping_add(1);
            self.stalled_frames = 0;
            if offset.length() > 1.0 {
                break;
            }
        }
        None
    }
}

/// Waypoint `index` of a serpentine over the board's rows, bottom row first.
///
/// Each row contributes its two ends; odd rows are walked right to left.
fn sweep_waypoint(index: usize, cells: usize, cell_length: f32) -> Vec2 {
    let row = index / 2;
    let at_end = index % 2 == 1;
    let rightward = row % 2 == 0;
    let column = if at_end == rightward { cells - 1 } else { 0 };
    let world_row = cells - 1 - row.min(cells - 1);
    Vec2::new(
        column as f32 * cell_length,
        world_row as f32 * cell_length,
    )
}

impl InputSource for Pilot {
    fn poll(&mut self, _frame: u64, scene: &Scene) -> FrameInput {
        if scene.hud.finished {
            return FrameInput {
                quit: true,
                ..FrameInput::default()
            };
        }

        match self.kind {
            PilotKind::Idle => FrameInput::default(),
            PilotKind::Wander => FrameInput {
                held: self.wander(),
                ..FrameInput::default()
            },
            PilotKind::Sweep => FrameInput {
                joystick: self.sweep(scene),
                ..FrameInput::default()
            },
        }
    }
}
