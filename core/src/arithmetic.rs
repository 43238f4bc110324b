//! Number-theory kernel backing the grid classifier.
//!
//! Everything here is total: the origin is resolved by explicit branches so no
//! caller ever observes a division by zero or a non-finite coordinate.

use serde::{Deserialize, Serialize};

use crate::GridSize;

/// Greatest common divisor of the absolute values of `a` and `b`.
///
/// `gcd(0, 0)` is `0`.
#[must_use]
pub const fn gcd(a: i64, b: i64) -> u64 {
    let mut a = a.unsigned_abs();
    let mut b = b.unsigned_abs();
    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }
    a
}

/// Reports whether `x` and `y` share no common divisor other than one.
///
/// The origin is never coprime. Any pair containing a one (and a non-zero
/// partner) is coprime through the general rule, not through a special case.
#[must_use]
pub const fn is_coprime(x: i64, y: i64) -> bool {
    if x == 0 && y == 0 {
        return false;
    }
    gcd(x, y) == 1
}

/// Non-linear scatter position of a cell used by the warp layout.
///
/// Coordinates are expressed in cell units along the mathematical axes: `x`
/// grows to the right and `y` grows upward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemappedPoint {
    x: f32,
    y: f32,
}

impl RemappedPoint {
    /// Creates a remapped point from cell-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in cell units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in cell units, increasing upward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Maps cell `(x, y)` onto its warp-layout position.
///
/// The horizontal coordinate is `x / (x + y)` scaled across the grid width and
/// the vertical coordinate is `gcd(x, y)`. The function does not assume its
/// input is coprime.
#[must_use]
pub fn remap_position(x: u32, y: u32, grid_size: GridSize) -> RemappedPoint {
    let ratio = if x == 0 && y == 0 {
        0.0
    } else {
        f64::from(x) / (f64::from(x) + f64::from(y))
    };
    let span = f64::from(grid_size.get().saturating_sub(1));
    let rise = gcd(i64::from(x), i64::from(y));

    RemappedPoint::new((ratio * span) as f32, rise as f32)
}

#[cfg(test)]
mod tests {
    use super::{gcd, is_coprime, remap_position};
    use crate::GridSize;
    use proptest::prelude::*;

    #[test]
    fn gcd_of_origin_is_zero() {
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn gcd_uses_absolute_values() {
        assert_eq!(gcd(-12, 18), 6);
        assert_eq!(gcd(12, -18), 6);
        assert_eq!(gcd(0, -7), 7);
    }

    #[test]
    fn ones_are_coprime_with_everything_non_zero() {
        assert!(is_coprime(1, 0));
        assert!(is_coprime(0, 1));
        assert!(is_coprime(1, 199));
        assert!(is_coprime(150, 1));
    }

    #[test]
    fn origin_is_not_coprime() {
        assert!(!is_coprime(0, 0));
    }

    #[test]
    fn zero_column_is_coprime_only_with_one() {
        assert!(!is_coprime(0, 2));
        assert!(!is_coprime(5, 0));
    }

    #[test]
    fn remap_sends_origin_to_origin() {
        let point = remap_position(0, 0, GridSize::new(10));
        assert_eq!(point.x(), 0.0);
        assert_eq!(point.y(), 0.0);
    }

    #[test]
    fn remap_scales_ratio_across_grid_width() {
        let point = remap_position(1, 2, GridSize::new(10));
        assert!((point.x() - 3.0).abs() < 1e-5);
        assert_eq!(point.y(), 1.0);

        let edge = remap_position(4, 0, GridSize::new(10));
        assert!((edge.x() - 9.0).abs() < 1e-5);
        assert_eq!(edge.y(), 4.0);
    }

    #[test]
    fn remap_does_not_assume_coprime_input() {
        let point = remap_position(6, 6, GridSize::new(20));
        assert!((point.x() - 9.5).abs() < 1e-5);
        assert_eq!(point.y(), 6.0);
    }

    #[test]
    fn remap_tolerates_single_cell_grid() {
        let point = remap_position(0, 0, GridSize::new(1));
        assert_eq!(point.x(), 0.0);
        assert!(point.x().is_finite() && point.y().is_finite());
    }

    proptest! {
        #[test]
        fn coprime_matches_gcd_outside_origin(x in 0i64..10_000, y in 0i64..10_000) {
            prop_assume!(x != 0 || y != 0);
            prop_assert_eq!(is_coprime(x, y), gcd(x, y) == 1);
        }

        #[test]
        fn gcd_divides_both_inputs(x in 1i64..100_000, y in 1i64..100_000) {
            let divisor = gcd(x, y) as i64;
            prop_assert_eq!(x % divisor, 0);
            prop_assert_eq!(y % divisor, 0);
        }

        #[test]
        fn remapped_points_stay_inside_grid(x in 0u32..200, y in 0u32..200, size in 1u32..=200) {
            prop_assume!(x < size && y < size);
            let point = remap_position(x, y, GridSize::new(size));
            prop_assert!(point.x() >= 0.0);
            prop_assert!(point.x() <= (size - 1) as f32 + 1e-3);
            prop_assert!(point.y() <= (size - 1) as f32);
        }
    }
}
