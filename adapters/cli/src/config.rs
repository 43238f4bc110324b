//! Command-line and file configuration for a Popcorn run.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use popcorn_core::{GridSize, TargetMode};
use popcorn_rendering::ThemeKey;
use popcorn_world::DEFAULT_GRID_SIZE;
use serde::Deserialize;
use thiserror::Error;

use crate::pilot::PilotKind;

/// Smallest selectable grid size.
pub(crate) const MIN_GRID_SIZE: u32 = 10;
/// Largest selectable grid size.
pub(crate) const MAX_GRID_SIZE: u32 = 200;
/// Grid sizes must be multiples of this step.
pub(crate) const GRID_SIZE_STEP: u32 = 10;

const DEFAULT_FRAMES: u64 = 3_600;
const DEFAULT_FRAME_MS: u64 = 16;
const DEFAULT_SEED: u64 = 0x5eed;

/// Command-line arguments accepted by the `popcorn` binary.
#[derive(Debug, Default, Parser)]
#[command(name = "popcorn", about = "Runs the Popcorn coprime-grid arcade engine headlessly")]
pub(crate) struct CliArgs {
    /// Cells along each grid edge (10 to 200, step 10).
    #[arg(long)]
    pub(crate) grid_size: Option<u32>,
    /// Start with the non-coprime rule set.
    #[arg(long)]
    pub(crate) inverted: bool,
    /// Start in warp traversal.
    #[arg(long)]
    pub(crate) warp: bool,
    /// Color theme: modern, emerald, crimson or math.
    #[arg(long)]
    pub(crate) theme: Option<ThemeKey>,
    /// Maximum number of frames to simulate.
    #[arg(long)]
    pub(crate) frames: Option<u64>,
    /// Simulated frame duration in milliseconds.
    #[arg(long)]
    pub(crate) frame_ms: Option<u64>,
    /// Seed for the wandering autopilot.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Autopilot supplying movement input.
    #[arg(long, value_enum)]
    pub(crate) pilot: Option<PilotKind>,
    /// TOML file providing defaults for any flag.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Print the run summary as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Session defaults loaded from a TOML file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    grid_size: Option<u32>,
    inverted: Option<bool>,
    warp: Option<bool>,
    theme: Option<ThemeKey>,
    frames: Option<u64>,
    frame_ms: Option<u64>,
    seed: Option<u64>,
    pilot: Option<PilotKind>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors raised while resolving the run configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// Grid size lies outside the selectable range.
    #[error("grid size {value} is outside {min}..={max}", min = MIN_GRID_SIZE, max = MAX_GRID_SIZE)]
    GridSizeOutOfRange {
        /// Rejected value.
        value: u32,
    },
    /// Grid size is not a multiple of the selection step.
    #[error("grid size {value} is not a multiple of {step}", step = GRID_SIZE_STEP)]
    GridSizeStep {
        /// Rejected value.
        value: u32,
    },
    /// Frames must advance the clock.
    #[error("frame duration must be at least one millisecond")]
    ZeroFrameDuration,
    /// The configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying TOML failure.
        source: toml::de::Error,
    },
}

/// Validates a user supplied grid size.
pub(crate) fn validate_grid_size(value: u32) -> Result<GridSize, ConfigError> {
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&value) {
        return Err(ConfigError::GridSizeOutOfRange { value });
    }
    if value % GRID_SIZE_STEP != 0 {
        return Err(ConfigError::GridSizeStep { value });
    }
    Ok(GridSize::new(value))
}

/// Fully resolved settings for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) grid_size: GridSize,
    pub(crate) target_mode: TargetMode,
    pub(crate) warp: bool,
    pub(crate) theme: ThemeKey,
    pub(crate) frames: u64,
    pub(crate) frame_dt: Duration,
    pub(crate) seed: u64,
    pub(crate) pilot: PilotKind,
    pub(crate) json: bool,
}

impl RunConfig {
    /// Merges command-line flags over the optional configuration file.
    pub(crate) fn resolve(args: CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let grid_size = match args.grid_size.or(file.grid_size) {
            Some(value) => validate_grid_size(value)?,
            None => DEFAULT_GRID_SIZE,
        };

        let inverted = args.inverted || file.inverted.unwrap_or(false);
        let target_mode = if inverted {
            TargetMode::NonCoprime
        } else {
            TargetMode::Coprime
        };

        let frame_ms = args
            .frame_ms
            .or(file.frame_ms)
            .unwrap_or(DEFAULT_FRAME_MS);
        if frame_ms == 0 {
            return Err(ConfigError::ZeroFrameDuration);
        }

        Ok(Self {
            grid_size,
            target_mode,
            warp: args.warp || file.warp.unwrap_or(false),
            theme: args.theme.or(file.theme).unwrap_or_default(),
            frames: args.frames.or(file.frames).unwrap_or(DEFAULT_FRAMES),
            frame_dt: Duration::from_millis(frame_ms),
            seed: args.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            pilot: args.pilot.or(file.pilot).unwrap_or_default(),
            json: args.json,
        })
    }
}
