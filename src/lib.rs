//! Roller - a growing sphere that rolls up whatever it can swallow
//!
//! Core modules:
//! - `sim`: Simulation core (integration, absorption, population, rollup overlay)
//! - `renderer`: Drawing boundary and the per-frame scene painter
//! - `platform`: Tick pacing, input commands and sprite loading
//! - `tuning`: Data-driven physics and spawning constants
//! - `session`: Owns one world and drives it from host callbacks

pub mod platform;
pub mod renderer;
pub mod session;
pub mod sim;
pub mod tuning;

pub use session::Session;
pub use tuning::{Tuning, TuningError};

use std::f32::consts::TAU;

/// Fixed constants that are not worth tuning
pub mod consts {
    /// Horizon line as a fraction of viewport height
    pub const HORIZON_FRACTION: f32 = 0.75;

    /// Milliseconds between frame rate diagnostics
    pub const DIAGNOSTIC_INTERVAL_MS: f64 = 1000.0;

    /// Clamp range for the user zoom factor
    pub const MIN_USER_ZOOM: f32 = 0.125;
    pub const MAX_USER_ZOOM: f32 = 8.0;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap a coordinate into the half-open band [lo, lo + span)
///
/// A value just past either edge moves by exactly one `span`.
#[inline]
pub fn wrap_coordinate(value: f32, lo: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return value;
    }
    let hi = lo + span;
    if value >= lo && value < hi {
        return value;
    }
    let turns = ((value - lo) / span).floor();
    let wrapped = value - turns * span;
    // Guard the upper edge against float rounding
    if wrapped >= hi { wrapped - span } else { wrapped }
}

/// Sign of `value` as -1, 0 or 1, with an explicit zero band
#[inline]
pub fn sign_or_zero(value: f32, epsilon: f32) -> i8 {
    if value > epsilon {
        1
    } else if value < -epsilon {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-9) < TAU);
    }

    #[test]
    fn test_wrap_coordinate_overshoot_both_sides() {
        let lo = -150.0;
        let span = 300.0;
        let eps = 0.5;
        let above = wrap_coordinate(lo + span + eps, lo, span);
        assert!((above - (lo + eps)).abs() < 1e-4);
        let below = wrap_coordinate(lo - eps, lo, span);
        assert!((below - (lo + span - eps)).abs() < 1e-4);
    }

    #[test]
    fn test_sign_or_zero() {
        assert_eq!(sign_or_zero(3.0, 1e-6), 1);
        assert_eq!(sign_or_zero(-3.0, 1e-6), -1);
        assert_eq!(sign_or_zero(0.0, 1e-6), 0);
        assert_eq!(sign_or_zero(-0.0, 1e-6), 0);
    }

    proptest! {
        #[test]
        fn prop_wrap_coordinate_lands_in_band(value in -1.0e4f32..1.0e4, lo in -500.0f32..500.0, span in 1.0f32..1000.0) {
            let wrapped = wrap_coordinate(value, lo, span);
            prop_assert!(wrapped >= lo - 1e-3);
            prop_assert!(wrapped < lo + span + 1e-3);
        }

        #[test]
        fn prop_small_overshoot_moves_one_span(eps in 0.001f32..10.0, lo in -500.0f32..500.0, span in 50.0f32..1000.0) {
            let up = wrap_coordinate(lo + span + eps, lo, span);
            prop_assert!((up - (lo + eps)).abs() < 1e-2);
            let down = wrap_coordinate(lo - eps, lo, span);
            prop_assert!((down - (lo + span - eps)).abs() < 1e-2);
        }

        #[test]
        fn prop_wrap_angle_in_range(angle in -100.0f32..100.0) {
            let a = wrap_angle(angle);
            prop_assert!(a >= 0.0);
            prop_assert!(a < TAU);
        }
    }
}
