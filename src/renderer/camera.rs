//! World-to-screen transform derived from the roller

use glam::Vec2;

use crate::consts::HORIZON_FRACTION;
use crate::sim::World;

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Screen y of the ground line
    pub fn horizon(&self) -> f32 {
        (self.height * HORIZON_FRACTION).round()
    }
}

/// Stateless view: the roller's x and the ground line pinned to an anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World point shown at `anchor`
    pub focus: Vec2,
    /// Screen point (pixels)
    pub anchor: Vec2,
    /// Pixels per world unit
    pub scale: f32,
}

impl Camera {
    pub fn follow(world: &World, viewport: Viewport) -> Self {
        Self {
            focus: Vec2::new(world.roller().pos.x, 0.0),
            anchor: Vec2::new(viewport.width / 2.0, viewport.horizon()),
            scale: world.camera_scale * world.user_zoom,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        self.anchor + (world - self.focus) * self.scale
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        self.focus + (screen - self.anchor) / self.scale
    }
}
