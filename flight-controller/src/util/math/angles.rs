//! Heading arithmetic in radians.
//!
//! Magnetic heading comes out of the estimator wrapped into `[0, 2π)`, so a
//! plain subtraction between two headings is wrong whenever they straddle
//! north. Everything here works on the shortest signed arc instead.

use core::f32::consts::{PI, TAU};

use libm::remainderf;

/// Maps any angle into `[-π, π)`.
pub fn wrap_pi(angle: f32) -> f32 {
    let wrapped = remainderf(angle, TAU);
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Maps any angle into `[0, 2π)`.
pub fn wrap_two_pi(angle: f32) -> f32 {
    let wrapped = wrap_pi(angle);
    if wrapped >= 0.0 {
        return wrapped;
    }
    let positive = wrapped + TAU;
    if positive >= TAU {
        0.0
    } else {
        positive
    }
}

/// Signed shortest rotation taking `current` onto `target`.
///
/// `shortest_difference(1°, 359°)` is `+2°`, never `-358°`.
pub fn shortest_difference(target: f32, current: f32) -> f32 {
    wrap_pi(target - current)
}

/// Turns a wrapped heading stream into a continuous one, so a loop that
/// differentiates its measurement never sees the 2π jump at north.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingUnwrapper {
    last_wrapped: Option<f32>,
    continuous: f32,
}

impl HeadingUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, heading: f32) -> f32 {
        self.continuous = match self.last_wrapped {
            Some(previous) => self.continuous + shortest_difference(heading, previous),
            None => heading,
        };
        self.last_wrapped = Some(heading);
        self.continuous
    }

    pub fn current(&self) -> f32 {
        self.continuous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_shortest_difference_across_north() {
        let error = shortest_difference(1.0_f32.to_radians(), 359.0_f32.to_radians());
        assert_close(error, 2.0_f32.to_radians());

        let error = shortest_difference(359.0_f32.to_radians(), 1.0_f32.to_radians());
        assert_close(error, -2.0_f32.to_radians());
    }

    #[test]
    fn test_shortest_difference_without_wrap() {
        let error = shortest_difference(100.0_f32.to_radians(), 90.0_f32.to_radians());
        assert_close(error, 10.0_f32.to_radians());
    }

    #[test]
    fn test_wrap_pi_range() {
        assert_close(wrap_pi(2.5 * PI), 0.5 * PI);
        assert_close(wrap_pi(-0.5), -0.5);
        assert_close(wrap_pi(TAU + 0.25), 0.25);
        assert!(wrap_pi(PI) < PI);
    }

    #[test]
    fn test_wrap_two_pi_range() {
        assert_close(wrap_two_pi(-0.5), TAU - 0.5);
        assert_close(wrap_two_pi(TAU), 0.0);
        assert_close(wrap_two_pi(1.0), 1.0);
    }

    #[test]
    fn test_unwrapper_is_continuous_across_north() {
        let mut unwrapper = HeadingUnwrapper::new();
        unwrapper.update(358.0_f32.to_radians());
        unwrapper.update(359.0_f32.to_radians());
        let heading = unwrapper.update(1.0_f32.to_radians());
        assert_close(heading, 361.0_f32.to_radians());

        let heading = unwrapper.update(359.0_f32.to_radians());
        assert_close(heading, 359.0_f32.to_radians());
    }
}
