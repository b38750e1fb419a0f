//! Roller-vs-obstacle contact and the bounce / absorb decision
//!
//! Contact only counts when the roller is heading toward the obstacle: the
//! sign of its horizontal velocity must match the sign of the horizontal
//! displacement to the obstacle. A zero on either side closes the gate.

use glam::Vec2;

use super::rollup::{self, Stamp};
use super::state::{Body, BodyKind, World, area_of, radius_for_area};
use crate::platform::assets::SpriteAtlas;
use crate::sign_or_zero;
use crate::tuning::Tuning;

/// Result of a contact check
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// Whether the bodies touch and the roller is heading into the obstacle
    pub hit: bool,
    /// Centre distance
    pub distance: f32,
    /// Unit vector from roller toward obstacle
    pub normal: Vec2,
}

impl Contact {
    pub fn miss(distance: f32) -> Self {
        Self {
            hit: false,
            distance,
            normal: Vec2::ZERO,
        }
    }
}

/// What a resolved contact did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Bounced,
    Absorbed {
        old_radius: f32,
        new_radius: f32,
        /// Milestones crossed by this absorption
        milestones: u32,
    },
}

/// Directional gate: is the roller moving toward `target_x`?
pub fn heading_toward(roller: &Body, target_x: f32, epsilon: f32) -> bool {
    let moving = sign_or_zero(roller.vel.x, epsilon);
    let offset = sign_or_zero(target_x - roller.pos.x, 0.0);
    moving != 0 && moving == offset
}

/// Check contact between the roller and one obstacle
pub fn check_contact(roller: &Body, other: &Body, tuning: &Tuning) -> Contact {
    let delta = other.pos - roller.pos;
    let distance = delta.length();

    if !heading_toward(roller, other.pos.x, tuning.velocity_epsilon) {
        return Contact::miss(distance);
    }
    if distance > roller.radius + other.radius + tuning.contact_margin {
        return Contact::miss(distance);
    }

    // The gate guarantees a non-zero horizontal offset, so this never falls back
    let normal = delta
        .try_normalize()
        .unwrap_or_else(|| Vec2::new(roller.vel.x.signum(), 0.0));
    Contact {
        hit: true,
        distance,
        normal,
    }
}

/// Too big to swallow?
pub fn bounces_off(roller: &Body, other: &Body, tuning: &Tuning) -> bool {
    other.radius >= tuning.swallow_ratio * roller.radius
}

/// Momentum exchange for an obstacle too large to absorb
///
/// A fraction of the roller's momentum goes into the obstacle along the
/// contact normal and an opposing fraction is applied back to the roller.
pub fn bounce(roller: &mut Body, other: &mut Body, normal: Vec2, tuning: &Tuning) {
    let momentum = roller.mass() * roller.speed();
    let transfer = momentum * tuning.transfer_fraction;
    let rebound = momentum * tuning.rebound_fraction;

    other.vel += normal * (transfer / other.mass());
    roller.vel -= normal * (rebound / roller.mass());
}

/// Grow the roller by the obstacle's area and advance milestones
///
/// Returns (old radius, new radius, milestones crossed).
pub fn grow(
    milestone: &mut f32,
    camera_scale: &mut f32,
    roller: &mut Body,
    other: &Body,
    growth_factor: f32,
) -> (f32, f32, u32) {
    let old_radius = roller.radius;
    let new_radius = radius_for_area(area_of(old_radius) + other.area()).max(old_radius);
    roller.radius = new_radius;

    let mut crossed = 0;
    while new_radius >= *milestone {
        *milestone *= growth_factor;
        *camera_scale /= growth_factor;
        crossed += 1;
    }
    (old_radius, new_radius, crossed)
}

/// Resolve one obstacle against the roller
///
/// `index` addresses `world.bodies` and must not be the roller.
pub fn resolve(world: &mut World, index: usize, sprites: &SpriteAtlas) -> Option<Outcome> {
    debug_assert!(index > 0, "roller cannot collide with itself");
    let (head, rest) = world.bodies.split_at_mut(index);
    let roller = &mut head[0];
    let other = &mut rest[0];
    if !other.alive {
        return None;
    }

    let contact = check_contact(roller, other, &world.tuning);
    if !contact.hit {
        return None;
    }

    if bounces_off(roller, other, &world.tuning) {
        bounce(roller, other, contact.normal, &world.tuning);
        log::debug!(
            "Roller (r={:.2}) bounced off #{} (r={:.2})",
            roller.radius,
            other.id,
            other.radius
        );
        return Some(Outcome::Bounced);
    }

    let (old_radius, new_radius, milestones) = grow(
        &mut world.milestone,
        &mut world.camera_scale,
        roller,
        other,
        world.tuning.growth_factor,
    );
    if milestones > 0 {
        log::info!(
            "Roller reached r={:.2}; next milestone {:.2}, camera scale {:.4}",
            new_radius,
            world.milestone,
            world.camera_scale
        );
    }

    let stamp = Stamp {
        old_radius,
        new_radius,
        heading: roller.theta,
        offset: contact.normal * (new_radius - other.radius).max(0.0),
        stamp_radius: other.radius,
    };
    let resolution = world.tuning.overlay_resolution;
    if let BodyKind::Roller { overlay } = &mut roller.kind {
        let sprite = sprites.get(&other.sprite);
        if sprite.is_none() {
            log::debug!(
                "No pixels for sprite '{}'; overlay only rescaled",
                other.sprite.as_str()
            );
        }
        let next = rollup::composite(overlay.as_ref(), resolution, &stamp, sprite);
        *overlay = Some(next);
    }

    other.alive = false;
    world.absorbed += 1;
    log::debug!(
        "Absorbed #{} (r={:.2}); roller r {:.2} -> {:.2}",
        other.id,
        other.radius,
        old_radius,
        new_radius
    );

    Some(Outcome::Absorbed {
        old_radius,
        new_radius,
        milestones,
    })
}
