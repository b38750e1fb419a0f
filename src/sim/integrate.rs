//! Kinematic integration for a single body
//!
//! One integrator for every body; the roller gets no special handling here.

use super::state::{Body, WrapBand};
use crate::tuning::Tuning;
use crate::wrap_angle;

/// Advance `body` by `slice` seconds
///
/// Order: move by velocity (skipping near-zero axes), wrap x into the band and
/// θ into [0, 2π), then either clamp to the ground and roll, or fall.
pub fn integrate(body: &mut Body, slice: f32, band: WrapBand, tuning: &Tuning) {
    let slice = slice.max(0.0);
    let eps = tuning.velocity_epsilon;

    if body.vel.x.abs() >= eps {
        body.pos.x += body.vel.x * slice;
    }
    if body.vel.y.abs() >= eps {
        body.pos.y += body.vel.y * slice;
    }
    if body.spin.abs() >= eps {
        body.theta += body.spin * slice;
    }

    body.pos.x = band.wrap(body.pos.x);
    body.theta = wrap_angle(body.theta);

    if body.on_ground() {
        // Rolling: rest on the ground, spin slaved to horizontal motion
        body.pos.y = -body.radius;
        body.vel.y = 0.0;
        let damping = (1.0 - tuning.rolling_resistance * slice).max(0.0);
        body.vel.x *= damping;
        body.spin = body.vel.x / body.radius;
    } else {
        body.vel.y += tuning.gravity * slice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BodyKind, SpriteId};
    use glam::Vec2;
    use std::f32::consts::TAU;

    fn band() -> WrapBand {
        WrapBand {
            center: 0.0,
            world_width: 100.0,
        }
    }

    fn body(x: f32, y: f32, radius: f32) -> Body {
        let mut b = Body::resting(1, BodyKind::Obstacle, x, radius, SpriteId::new("test"));
        b.pos.y = y;
        b
    }

    #[test]
    fn test_ground_contact_clamps() {
        let tuning = Tuning::default();
        let mut b = body(0.0, -5.0, 5.0);
        b.vel.y = 50.0;
        integrate(&mut b, 1.0, band(), &tuning);
        assert_eq!(b.pos.y, -5.0);
        assert_eq!(b.vel.y, 0.0);

        // Next tick rolls: resistance, no gravity
        b.vel.x = 10.0;
        integrate(&mut b, 0.5, band(), &tuning);
        assert_eq!(b.vel.y, 0.0);
        assert_eq!(b.pos.y, -5.0);
        let expected = 10.0 * (1.0 - tuning.rolling_resistance * 0.5);
        assert!((b.vel.x - expected).abs() < 1e-5);
        assert!((b.spin - expected / 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_airborne_accelerates_down() {
        let tuning = Tuning::default();
        let mut b = body(0.0, -100.0, 5.0);
        integrate(&mut b, 0.1, band(), &tuning);
        assert!((b.vel.y - tuning.gravity * 0.1).abs() < 1e-4);
        // Position used the pre-gravity velocity (zero)
        assert_eq!(b.pos.y, -100.0);
    }

    #[test]
    fn test_jump_leaves_ground() {
        let tuning = Tuning::default();
        let mut b = body(0.0, -5.0, 5.0);
        b.vel.y = -300.0;
        integrate(&mut b, 0.1, band(), &tuning);
        assert!((b.pos.y - -35.0).abs() < 1e-4);
        assert!(b.vel.y > -300.0);
    }

    #[test]
    fn test_tiny_velocity_does_not_drift() {
        let tuning = Tuning::default();
        let mut b = body(10.0, -100.0, 5.0);
        b.vel = Vec2::new(1e-5, 0.0);
        integrate(&mut b, 1.0, band(), &tuning);
        assert_eq!(b.pos.x, 10.0);
    }

    #[test]
    fn test_zero_slice_keeps_position() {
        let tuning = Tuning::default();
        let mut b = body(10.0, -5.0, 5.0);
        b.vel.x = 20.0;
        integrate(&mut b, 0.0, band(), &tuning);
        assert_eq!(b.pos.x, 10.0);
        assert_eq!(b.vel.x, 20.0);
    }

    #[test]
    fn test_negative_slice_treated_as_zero() {
        let tuning = Tuning::default();
        let mut b = body(10.0, -5.0, 5.0);
        b.vel.x = 20.0;
        integrate(&mut b, -1.0, band(), &tuning);
        assert_eq!(b.pos.x, 10.0);
    }

    #[test]
    fn test_horizontal_wrap_both_directions() {
        let tuning = Tuning::default();
        let band = band();

        let mut right = body(149.0, -5.0, 5.0);
        right.vel.x = 2.0 / 0.01;
        integrate(&mut right, 0.01, band, &tuning);
        assert!((right.pos.x - -149.0).abs() < 1e-3);

        let mut left = body(-149.0, -5.0, 5.0);
        left.vel.x = -2.0 / 0.01;
        integrate(&mut left, 0.01, band, &tuning);
        assert!((left.pos.x - 149.0).abs() < 1e-3);
    }

    #[test]
    fn test_angle_wraps() {
        let tuning = Tuning::default();
        let mut b = body(0.0, -100.0, 5.0);
        b.theta = TAU - 0.1;
        b.spin = 1.0;
        integrate(&mut b, 0.2, band(), &tuning);
        assert!(b.theta >= 0.0 && b.theta < TAU);
        assert!((b.theta - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_heavy_resistance_never_reverses() {
        let tuning = Tuning {
            rolling_resistance: 5.0,
            ..Tuning::default()
        };
        let mut b = body(0.0, -5.0, 5.0);
        b.vel.x = 10.0;
        integrate(&mut b, 1.0, band(), &tuning);
        assert_eq!(b.vel.x, 0.0);
    }
}
