//! Rendering boundary
//!
//! The host implements [`Canvas`] over whatever raster API it has. The scene
//! painter only reads the world; it never mutates simulation state.

pub mod camera;
pub mod recording;
pub mod scene;

pub use camera::{Camera, Viewport};
pub use recording::{DrawOp, RecordingCanvas};
pub use scene::paint;

use glam::{Affine2, Vec2};

use crate::sim::{Overlay, SpriteId};

/// Straight RGBA colour, 0..1 per channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const SKY: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GROUND: Color = Color::rgb(0.0, 0.5, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `#rrggbb` for 2D canvas style strings
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// Axis-aligned screen rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// Translate, then rotate, then uniformly scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Vec2,
    pub rotate: f32,
    pub scale: f32,
}

impl Transform {
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), self.rotate, self.translate)
    }
}

/// Drawing primitives supplied by the host
///
/// Sprites and overlays are drawn centred on the current origin.
pub trait Canvas {
    fn fill_rect(&mut self, color: Color, rect: Rect);
    fn draw_sprite(&mut self, sprite: &SpriteId, size: Vec2);
    fn draw_overlay(&mut self, overlay: &Overlay, size: Vec2);
    /// Save state and apply `transform` on top of the current one
    fn push_transform(&mut self, transform: Transform);
    /// Restore the state saved by the matching push
    fn pop_transform(&mut self);

    /// Run `draw` inside a scoped transform that cannot leak to siblings
    fn with_transform<F>(&mut self, transform: Transform, draw: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        self.push_transform(transform);
        draw(self);
        self.pop_transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_css() {
        assert_eq!(Color::SKY.to_css(), "#0000ff");
        assert_eq!(Color::GROUND.to_css(), "#008000");
    }

    #[test]
    fn test_transform_order() {
        let t = Transform {
            translate: Vec2::new(100.0, 50.0),
            rotate: std::f32::consts::FRAC_PI_2,
            scale: 2.0,
        };
        let p = t.to_affine().transform_point2(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(100.0, 52.0)).length() < 1e-4);
    }
}
