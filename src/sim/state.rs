//! World state and core simulation types
//!
//! Coordinates: y = 0 is the ground line and "up" is negative, so a body
//! resting on the ground sits at y = -radius.

use std::f32::consts::PI;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rollup::Overlay;
use crate::tuning::Tuning;

/// Name of a drawable sprite, resolved by the asset collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(pub String);

impl SpriteId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which role a body plays
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// The single growing body under player control; owns the rollup overlay
    Roller { overlay: Option<Overlay> },
    /// Anything else in the world
    Obstacle,
}

/// A simulated disc
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    /// Orientation in [0, 2π)
    pub theta: f32,
    pub vel: Vec2,
    /// Angular velocity (radians/sec)
    pub spin: f32,
    pub radius: f32,
    pub alive: bool,
    pub sprite: SpriteId,
}

impl Body {
    /// A body at rest on the ground at horizontal position `x`
    pub fn resting(id: u32, kind: BodyKind, x: f32, radius: f32, sprite: SpriteId) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(x, -radius),
            theta: 0.0,
            vel: Vec2::ZERO,
            spin: 0.0,
            radius,
            alive: true,
            sprite,
        }
    }

    pub fn is_roller(&self) -> bool {
        matches!(self.kind, BodyKind::Roller { .. })
    }

    /// 2πr²
    pub fn area(&self) -> f32 {
        area_of(self.radius)
    }

    /// (4/3)πr³
    pub fn mass(&self) -> f32 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Lower extent touches or crosses the ground line
    pub fn on_ground(&self) -> bool {
        self.pos.y >= -self.radius
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        match &self.kind {
            BodyKind::Roller { overlay } => overlay.as_ref(),
            BodyKind::Obstacle => None,
        }
    }
}

/// Area measure used for absorption bookkeeping
#[inline]
pub fn area_of(radius: f32) -> f32 {
    2.0 * PI * radius * radius
}

/// Inverse of [`area_of`]
#[inline]
pub fn radius_for_area(area: f32) -> f32 {
    (area / (2.0 * PI)).max(0.0).sqrt()
}

/// Horizontal wrap band: three world widths centred on `center`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapBand {
    pub center: f32,
    pub world_width: f32,
}

impl WrapBand {
    pub fn span(&self) -> f32 {
        self.world_width * 3.0
    }

    pub fn lo(&self) -> f32 {
        self.center - self.span() / 2.0
    }

    pub fn hi(&self) -> f32 {
        self.center + self.span() / 2.0
    }

    pub fn wrap(&self, x: f32) -> f32 {
        crate::wrap_coordinate(x, self.lo(), self.span())
    }
}

/// One independent simulation
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Roller first, then obstacles in spawn order
    pub bodies: Vec<Body>,
    /// Next roller radius that triggers a camera rescale
    pub milestone: f32,
    /// World-to-screen scale; shrinks as the roller grows
    pub camera_scale: f32,
    /// Player-controlled zoom on top of `camera_scale`
    pub user_zoom: f32,
    /// Centre of the wrap band, recentred on the roller every step
    pub wrap_center: f32,
    /// Number of absorptions so far
    pub absorbed: u32,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Create a world with the roller at the origin and no obstacles yet
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let roller_radius = tuning.roller_radius;
        let roller_sprite = SpriteId::new(tuning.roller_sprite.clone());
        let milestone = roller_radius * tuning.growth_factor;
        let mut world = Self {
            tuning,
            bodies: Vec::new(),
            milestone,
            camera_scale: 1.0,
            user_zoom: 1.0,
            wrap_center: 0.0,
            absorbed: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        let id = world.next_entity_id();
        world.bodies.push(Body::resting(
            id,
            BodyKind::Roller { overlay: None },
            0.0,
            roller_radius,
            roller_sprite,
        ));
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn roller(&self) -> &Body {
        &self.bodies[0]
    }

    pub fn roller_mut(&mut self) -> &mut Body {
        &mut self.bodies[0]
    }

    pub fn obstacles(&self) -> &[Body] {
        &self.bodies[1..]
    }

    pub fn live_obstacles(&self) -> usize {
        self.obstacles().iter().filter(|b| b.alive).count()
    }

    /// Width of one world in world units at the current camera scale
    pub fn world_width(&self) -> f32 {
        self.tuning.world_width / self.camera_scale
    }

    pub fn wrap_band(&self) -> WrapBand {
        WrapBand {
            center: self.wrap_center,
            world_width: self.world_width(),
        }
    }

    /// Add an obstacle; returns its ID
    pub fn insert_obstacle(&mut self, x: f32, radius: f32, sprite: SpriteId) -> u32 {
        let id = self.next_entity_id();
        self.bodies
            .push(Body::resting(id, BodyKind::Obstacle, x, radius, sprite));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_has_only_roller() {
        let world = World::new(Tuning::default(), 1);
        assert_eq!(world.bodies.len(), 1);
        assert!(world.roller().is_roller());
        assert_eq!(world.roller().pos, Vec2::new(0.0, -10.0));
        assert_eq!(world.milestone, 20.0);
        assert_eq!(world.camera_scale, 1.0);
    }

    #[test]
    fn test_derived_quantities() {
        let body = Body::resting(1, BodyKind::Obstacle, 0.0, 3.0, SpriteId::new("x"));
        assert!((body.area() - 2.0 * PI * 9.0).abs() < 1e-4);
        assert!((body.mass() - 36.0 * PI).abs() < 1e-3);
        assert!(body.on_ground());
    }

    #[test]
    fn test_radius_for_area_inverts_area() {
        for r in [0.5f32, 1.0, 10.0, 137.0] {
            assert!((radius_for_area(area_of(r)) - r).abs() < 1e-3 * r);
        }
    }

    #[test]
    fn test_wrap_band_bounds() {
        let band = WrapBand {
            center: 100.0,
            world_width: 200.0,
        };
        assert_eq!(band.lo(), -200.0);
        assert_eq!(band.hi(), 400.0);
        assert!((band.wrap(401.0) - -199.0).abs() < 1e-4);
    }

    #[test]
    fn test_world_width_follows_camera() {
        let mut world = World::new(Tuning::default(), 1);
        world.camera_scale = 0.5;
        assert_eq!(world.world_width(), 2048.0);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut world = World::new(Tuning::default(), 1);
        let a = world.insert_obstacle(50.0, 3.0, SpriteId::new("pebble"));
        let b = world.insert_obstacle(90.0, 3.0, SpriteId::new("pebble"));
        assert_ne!(a, b);
        assert_ne!(a, world.roller().id);
    }
}
