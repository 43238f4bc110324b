#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Popcorn adapters.

mod input;
mod scene;
mod theme;

use anyhow::Result as AnyResult;
use std::{error::Error, fmt, time::Duration};

pub use input::{apply_key, Direction, FrameInput};
pub use scene::{
    format_elapsed, grid_readout, CellFill, CellPresentation, GridPresentation, Hud,
    PlayerPresentation, Scene,
};
pub use theme::{ColorTheme, ThemeKey};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_rgb_hex(rgb: u32) -> Self {
        Self::from_rgb_u8(
            ((rgb >> 16) & 0xff) as u8,
            ((rgb >> 8) & 0xff) as u8,
            (rgb & 0xff) as u8,
        )
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Popcorn scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, per-frame
    /// input captured by the adapter, and mutates the scene before it is
    /// presented, allowing adapters to step the world deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderingError {
    /// The requested theme does not exist.
    UnknownTheme {
        /// Normalised name that failed to match.
        name: String,
    },
    /// The board must have a positive, finite side length.
    InvalidWorldLength {
        /// Side length that failed validation.
        world_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTheme { name } => {
                let known: Vec<_> = ThemeKey::ALL.iter().map(|key| key.key()).collect();
                write!(
                    f,
                    "unknown theme `{name}` (expected one of: {})",
                    known.join(", ")
                )
            }
            Self::InvalidWorldLength { world_length } => {
                write!(
                    f,
                    "world length must be positive and finite (received {world_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_unpack_channels() {
        assert_eq!(
            Color::from_rgb_hex(0x38bdf8),
            Color::from_rgb_u8(0x38, 0xbd, 0xf8)
        );
        assert_eq!(Color::from_rgb_hex(0x000000), Color::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn lighten_moves_towards_white() {
        let lifted = Color::new(0.0, 0.5, 1.0, 0.25).lighten(0.5);
        assert_eq!(lifted, Color::new(0.5, 0.75, 1.0, 0.25));
        assert_eq!(Color::new(0.2, 0.2, 0.2, 1.0).lighten(4.0).red, 1.0);
    }

    #[test]
    fn presentation_keeps_title_and_scene() {
        let geometry =
            popcorn_core::GridGeometry::with_default_world(popcorn_core::GridSize::new(10));
        let scene = Scene::new(geometry, ThemeKey::Crimson).expect("valid board");
        let presentation = Presentation::new(
            "Popcorn",
            ThemeKey::Crimson.theme().background,
            scene.clone(),
        );
        assert_eq!(presentation.window_title, "Popcorn");
        assert_eq!(presentation.scene, scene);
    }
}
