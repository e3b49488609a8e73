//! Geometric transform parameters.

use serde::{Deserialize, Serialize};

/// Rotation, flip and free-rotation settings applied at render time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Clockwise quarter turns, always in 0..=3.
    pub quarter_turns: u8,
    /// Mirror along the vertical axis.
    pub flip_h: bool,
    /// Mirror along the horizontal axis.
    pub flip_v: bool,
    /// Extra clockwise rotation in degrees, in [0, 360).
    pub free_rotation: f64,
}

impl TransformState {
    /// Check if all values are at their defaults
    pub fn is_identity(&self) -> bool {
        self.quarter_turns == 0 && !self.flip_h && !self.flip_v && self.free_rotation == 0.0
    }

    /// Turn 90° clockwise.
    pub fn rotate_right(&mut self) {
        self.quarter_turns = (self.quarter_turns + 1) % 4;
    }

    /// Turn 90° counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.quarter_turns = (self.quarter_turns + 3) % 4;
    }

    /// Set the free rotation, wrapping into [0, 360).
    pub fn set_free_rotation(&mut self, degrees: f64) {
        let wrapped = if degrees.is_finite() {
            degrees.rem_euclid(360.0)
        } else {
            0.0
        };
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        self.free_rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }

    /// Rotation in degrees from the quarter turns alone.
    pub fn step_degrees(&self) -> f64 {
        self.quarter_turns as f64 * 90.0
    }

    /// Total clockwise rotation in degrees (quarter turns plus free rotation).
    pub fn total_degrees(&self) -> f64 {
        self.step_degrees() + self.free_rotation
    }

    /// True when an odd number of quarter turns swaps width and height.
    #[inline]
    pub fn swaps_dimensions(&self) -> bool {
        self.quarter_turns % 2 == 1
    }

    /// Canvas size for a given resize target under this transform.
    pub fn canvas_size(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert!(TransformState::default().is_identity());
    }

    #[test]
    fn test_rotate_right_wraps() {
        let mut t = TransformState::default();
        for expected in [1, 2, 3, 0] {
            t.rotate_right();
            assert_eq!(t.quarter_turns, expected);
        }
    }

    #[test]
    fn test_rotate_left_never_negative() {
        let mut t = TransformState::default();
        t.rotate_left();
        assert_eq!(t.quarter_turns, 3);
        assert_eq!(t.step_degrees(), 270.0);
    }

    #[test]
    fn test_left_then_right_cancels() {
        let mut t = TransformState::default();
        t.rotate_left();
        t.rotate_right();
        assert!(t.is_identity());
    }

    #[test]
    fn test_free_rotation_wraps() {
        let mut t = TransformState::default();
        t.set_free_rotation(370.0);
        assert!((t.free_rotation - 10.0).abs() < 1e-9);

        t.set_free_rotation(-30.0);
        assert!((t.free_rotation - 330.0).abs() < 1e-9);

        t.set_free_rotation(f64::NAN);
        assert_eq!(t.free_rotation, 0.0);
    }

    #[test]
    fn test_canvas_size_swaps_on_odd_turns() {
        let mut t = TransformState::default();
        assert_eq!(t.canvas_size(200, 100), (200, 100));
        t.rotate_right();
        assert_eq!(t.canvas_size(200, 100), (100, 200));
        t.rotate_right();
        assert_eq!(t.canvas_size(200, 100), (200, 100));
    }

    #[test]
    fn test_total_degrees() {
        let mut t = TransformState::default();
        t.rotate_right();
        t.set_free_rotation(15.0);
        assert!((t.total_degrees() - 105.0).abs() < 1e-9);
    }
}
