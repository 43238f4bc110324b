//! Per-frame input gathered by adapters before the simulation steps.

use popcorn_core::{GridSize, HeldDirections, JoystickVector, MovementInput};

/// Cardinal direction bound to a movement key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward the top of the board.
    Up,
    /// Toward the bottom of the board.
    Down,
    /// Toward the left edge.
    Left,
    /// Toward the right edge.
    Right,
}

impl Direction {
    /// Maps a key name onto its movement direction, ignoring case.
    ///
    /// `w`/`s`/`a`/`d` and the arrow keys are recognised.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Self::Up),
            "s" | "arrowdown" => Some(Self::Down),
            "a" | "arrowleft" => Some(Self::Left),
            "d" | "arrowright" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Records a key transition in the held-direction set.
///
/// Returns `false` when the key is not a movement key.
pub fn apply_key(held: &mut HeldDirections, key: &str, pressed: bool) -> bool {
    let Some(direction) = Direction::from_key(key) else {
        return false;
    };
    match direction {
        Direction::Up => held.up = pressed,
        Direction::Down => held.down = pressed,
        Direction::Left => held.left = pressed,
        Direction::Right => held.right = pressed,
    }
    true
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Movement keys held during the frame.
    pub held: HeldDirections,
    /// On-screen joystick vector; replaces `held` when present.
    pub joystick: Option<JoystickVector>,
    /// Whether the warp toggle was pressed this frame.
    pub toggle_warp: bool,
    /// Whether the inverted-rule toggle was pressed this frame.
    pub toggle_inverted: bool,
    /// Whether a restart was requested this frame.
    pub restart: bool,
    /// New grid size selected this frame, if any.
    pub grid_size: Option<GridSize>,
    /// Whether the adapter should stop after this frame.
    pub quit: bool,
}

impl FrameInput {
    /// Movement portion of the frame input.
    #[must_use]
    pub const fn movement(&self) -> MovementInput {
        MovementInput {
            held: self.held,
            joystick: self.joystick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_accepts_letters_and_arrows() {
        assert_eq!(Direction::from_key("W"), Some(Direction::Up));
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("a"), Some(Direction::Left));
        assert_eq!(Direction::from_key("ARROWRIGHT"), Some(Direction::Right));
        assert_eq!(Direction::from_key("q"), None);
    }

    #[test]
    fn key_transitions_update_held_set() {
        let mut held = HeldDirections::NONE;
        assert!(apply_key(&mut held, "d", true));
        assert!(apply_key(&mut held, "ArrowUp", true));
        assert!(held.right && held.up);

        assert!(apply_key(&mut held, "D", false));
        assert!(!held.right);
        assert!(!apply_key(&mut held, "Space", true));
        assert!(held.up);
    }

    #[test]
    fn movement_forwards_joystick_override() {
        let input = FrameInput {
            held: HeldDirections {
                left: true,
                ..HeldDirections::NONE
            },
            joystick: Some(JoystickVector::new(0.0, -1.0)),
            ..FrameInput::default()
        };
        let movement = input.movement();
        assert!(movement.held.left);
        assert_eq!(movement.joystick, Some(JoystickVector::new(0.0, -1.0)));
    }
}
