//! Declarative scene populated from world snapshots.

use std::time::Duration;

use glam::Vec2;
use popcorn_core::{CellCoord, CellState, GridGeometry, SessionSnapshot, WorldPosition};

use crate::{Color, ColorTheme, RenderingError, ThemeKey};

/// Amount the player fill is lightened to produce its glow.
const PLAYER_GLOW: f32 = 0.35;

/// Fill category of a rendered cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellFill {
    /// Already consumed this session.
    Eaten,
    /// A target still waiting to be eaten.
    Eatable,
    /// Never eaten under the active rules.
    NonEatable,
}

impl CellFill {
    /// Classifies a cell state. Consumption takes precedence over classification.
    #[must_use]
    pub const fn of(state: &CellState) -> Self {
        if state.consumed {
            Self::Eaten
        } else if state.target {
            Self::Eatable
        } else {
            Self::NonEatable
        }
    }

    /// Theme color used to fill this category.
    #[must_use]
    pub const fn color(self, theme: &ColorTheme) -> Color {
        match self {
            Self::Eaten => theme.eaten,
            Self::Eatable => theme.eatable,
            Self::NonEatable => theme.non_eatable,
        }
    }
}

/// Single cell drawn at its layout position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Grid coordinate of the cell.
    pub cell: CellCoord,
    /// Top-left draw position in world units.
    pub origin: Vec2,
    /// Fill category.
    pub fill: CellFill,
}

/// Describes the square board and its scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of cells along each edge.
    pub cells_per_side: u32,
    /// Side length of the board in world units.
    pub world_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Creates a new board descriptor.
    ///
    /// Returns an error when the board would have no area.
    pub fn new(
        geometry: GridGeometry,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        let world_length = geometry.world_length();
        if !world_length.is_finite() || world_length <= 0.0 {
            return Err(RenderingError::InvalidWorldLength { world_length });
        }

        Ok(Self {
            cells_per_side: geometry.grid_size().get(),
            world_length,
            line_color,
        })
    }

    /// Side length of one cell.
    #[must_use]
    pub fn cell_length(&self) -> f32 {
        self.world_length / self.cells_per_side.max(1) as f32
    }
}

/// Player footprint drawn as a glowing square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Top-left draw position in world units.
    pub origin: Vec2,
    /// Side length of the footprint.
    pub size: f32,
    /// Fill color.
    pub color: Color,
    /// Glow color drawn around the footprint.
    pub glow: Color,
}

/// Heads-up display values derived from the session snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    /// Accumulated score.
    pub score: i64,
    /// Elapsed time formatted as `MM:SS:CC`.
    pub elapsed: String,
    /// Number of cells eaten.
    pub eaten: u64,
    /// Number of targets in the session.
    pub total: u64,
    /// Completion percentage in `0.0..=100.0`.
    pub progress_percent: f32,
    /// Active rule label.
    pub rule_label: &'static str,
    /// Whether warp traversal is active.
    pub warp: bool,
    /// Whether every target has been eaten.
    pub finished: bool,
    /// Player position as grid coordinates, formatted `X:gx Y:gy`.
    pub position_readout: String,
}

impl Hud {
    /// Derives HUD values from the session.
    #[must_use]
    pub fn from_session(session: &SessionSnapshot, geometry: GridGeometry) -> Self {
        let (column, grid_y) = grid_readout(session.player, geometry);
        Self {
            score: session.score,
            elapsed: format_elapsed(session.elapsed),
            eaten: session.eaten_count,
            total: session.total_to_eat,
            progress_percent: session.progress_percent(),
            rule_label: rule_label(session),
            warp: session.traversal.is_warp(),
            finished: session.finished,
            position_readout: format!("X:{column} Y:{grid_y}"),
        }
    }

    /// Whole-number percentage shown next to the progress bar.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{}%", self.progress_percent.floor() as u32)
    }
}

fn rule_label(session: &SessionSnapshot) -> &'static str {
    if session.target_mode.is_inverted() {
        "NON-COPRIME"
    } else {
        "COPRIME"
    }
}

/// Formats a duration as minutes, seconds and centiseconds: `MM:SS:CC`.
///
/// Minutes are not wrapped, so long sessions widen the first field.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let total_seconds = millis / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centis = (millis % 1000) / 10;
    format!("{minutes:02}:{seconds:02}:{centis:02}")
}

/// Grid column and grid `y` of the cell containing the player's top-left corner.
#[must_use]
pub fn grid_readout(position: WorldPosition, geometry: GridGeometry) -> (i64, i64) {
    let column = geometry.column_at(position.x());
    let grid_y = geometry.world_row_to_grid_y(geometry.world_row_at(position.y()));
    (column, grid_y)
}

/// Scene description combining the board, the player and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board layout.
    pub grid: GridPresentation,
    /// Active palette.
    pub theme: ThemeKey,
    /// Every cell at its current draw position.
    pub cells: Vec<CellPresentation>,
    /// Player footprint.
    pub player: PlayerPresentation,
    /// HUD values.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene for the board; call [`Scene::refresh`] to populate it.
    pub fn new(
        geometry: GridGeometry,
        theme: ThemeKey,
    ) -> std::result::Result<Self, RenderingError> {
        let palette = theme.theme();
        let grid = GridPresentation::new(geometry, palette.grid_line)?;
        Ok(Self {
            grid,
            theme,
            cells: Vec::new(),
            player: PlayerPresentation {
                origin: Vec2::ZERO,
                size: grid.cell_length(),
                color: palette.player,
                glow: palette.player.lighten(PLAYER_GLOW),
            },
            hud: Hud::default(),
        })
    }

    /// Repopulates the scene from the latest world snapshot.
    ///
    /// Cells carrying a remapped point are drawn at their warp position,
    /// others at their regular grid position.
    pub fn refresh<I>(
        &mut self,
        session: &SessionSnapshot,
        geometry: GridGeometry,
        cells: I,
    ) -> std::result::Result<(), RenderingError>
    where
        I: IntoIterator<Item = CellState>,
    {
        let palette = self.theme.theme();
        self.grid = GridPresentation::new(geometry, palette.grid_line)?;

        self.cells.clear();
        self.cells.extend(cells.into_iter().map(|state| {
            let origin = match state.remapped {
                Some(point) => geometry.remapped_origin(point),
                None => geometry.cell_origin(state.cell),
            };
            CellPresentation {
                cell: state.cell,
                origin: Vec2::new(origin.x(), origin.y()),
                fill: CellFill::of(&state),
            }
        }));

        self.player.origin = Vec2::new(session.player.x(), session.player.y());
        self.player.size = geometry.cell_length();
        self.hud = Hud::from_session(session, geometry);
        Ok(())
    }

    /// Number of cells currently drawn with the given fill.
    #[must_use]
    pub fn count_fill(&self, fill: CellFill) -> usize {
        self.cells.iter().filter(|cell| cell.fill == fill).count()
    }
}
