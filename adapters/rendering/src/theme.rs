//! Cosmetic color themes selectable at start-up.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Color, RenderingError};

/// Identifier of a built-in color theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKey {
    /// Dark slate board with amber targets.
    #[default]
    Modern,
    /// Deep green board.
    Emerald,
    /// Dark red board.
    Crimson,
    /// Light greyscale board.
    Math,
}

impl ThemeKey {
    /// Every built-in theme in presentation order.
    pub const ALL: [Self; 4] = [Self::Modern, Self::Emerald, Self::Crimson, Self::Math];

    /// Short key used on the command line and in configuration files.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Emerald => "emerald",
            Self::Crimson => "crimson",
            Self::Math => "math",
        }
    }

    /// Palette associated with the key.
    #[must_use]
    pub const fn theme(self) -> ColorTheme {
        match self {
            Self::Modern => ColorTheme {
                name: "Cyber Onyx",
                background: Color::from_rgb_hex(0x0f172a),
                grid_line: Color::from_rgb_hex(0x1e293b),
                player: Color::from_rgb_hex(0x38bdf8),
                eatable: Color::from_rgb_hex(0xfbbf24),
                non_eatable: Color::from_rgb_hex(0x1e293b),
                eaten: Color::from_rgb_hex(0x0f172a),
                accent: Color::from_rgb_hex(0x0ea5e9),
            },
            Self::Emerald => ColorTheme {
                name: "Forest Grid",
                background: Color::from_rgb_hex(0x064e3b),
                grid_line: Color::from_rgb_hex(0x065f46),
                player: Color::from_rgb_hex(0x34d399),
                eatable: Color::from_rgb_hex(0xfcd34d),
                non_eatable: Color::from_rgb_hex(0x064e3b),
                eaten: Color::from_rgb_hex(0x064e3b),
                accent: Color::from_rgb_hex(0x10b981),
            },
            Self::Crimson => ColorTheme {
                name: "Red Alert",
                background: Color::from_rgb_hex(0x450a0a),
                grid_line: Color::from_rgb_hex(0x7f1d1d),
                player: Color::from_rgb_hex(0xf87171),
                eatable: Color::from_rgb_hex(0xfbbf24),
                non_eatable: Color::from_rgb_hex(0x450a0a),
                eaten: Color::from_rgb_hex(0x450a0a),
                accent: Color::from_rgb_hex(0xef4444),
            },
            Self::Math => ColorTheme {
                name: "Monochrome Calc",
                background: Color::from_rgb_hex(0xfafafa),
                grid_line: Color::from_rgb_hex(0xe5e5e5),
                player: Color::from_rgb_hex(0x171717),
                eatable: Color::from_rgb_hex(0x525252),
                non_eatable: Color::from_rgb_hex(0xf5f5f5),
                eaten: Color::from_rgb_hex(0xfafafa),
                accent: Color::from_rgb_hex(0x262626),
            },
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ThemeKey {
    type Err = RenderingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.key() == normalized)
            .ok_or(RenderingError::UnknownTheme { name: normalized })
    }
}

/// Palette used to fill the board, the player and the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTheme {
    /// Human readable name.
    pub name: &'static str,
    /// Board clear color.
    pub background: Color,
    /// Grid line color.
    pub grid_line: Color,
    /// Player footprint fill.
    pub player: Color,
    /// Fill of cells that can still be eaten.
    pub eatable: Color,
    /// Fill of cells that are never eaten under the active rules.
    pub non_eatable: Color,
    /// Fill of cells already consumed.
    pub eaten: Color,
    /// HUD highlight color.
    pub accent: Color,
}
