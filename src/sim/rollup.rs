//! Rollup overlay: the roller's record of everything it has absorbed
//!
//! The overlay is a square pixel buffer in the roller's local (rotating)
//! frame. Pixel (0, 0) maps to local (-R, -R) and the far corner to (R, R),
//! where R is the roller radius at the last capture. It is painted through the
//! same rotation as the roller, so each stamp is counter-rotated by the
//! heading at capture time to land where it touched the ball.

use glam::{Affine2, Vec2};

use super::raster::Image;

/// Owned overlay buffer plus the radius it was captured at
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub image: Image,
    /// Roller radius the buffer spans (local -radius..radius on each axis)
    pub radius: f32,
    /// Bumped on every capture so hosts can cache uploaded textures
    pub revision: u32,
}

impl Overlay {
    pub fn blank(resolution: u32, radius: f32) -> Self {
        Self {
            image: Image::new(resolution, resolution),
            radius,
            revision: 0,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.image.width()
    }

    /// Buffer pixels per local world unit
    pub fn pixels_per_unit(&self) -> f32 {
        self.resolution() as f32 / (2.0 * self.radius)
    }

    /// Map a point in the roller's local frame to buffer pixel space
    pub fn local_to_pixel(&self, local: Vec2) -> Vec2 {
        let half = self.resolution() as f32 / 2.0;
        Vec2::splat(half) + local * self.pixels_per_unit()
    }
}

/// One absorption to record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stamp {
    /// Roller radius before the absorption
    pub old_radius: f32,
    /// Roller radius after the absorption
    pub new_radius: f32,
    /// Roller orientation at capture
    pub heading: f32,
    /// Stamp centre relative to the roller centre, in world axes
    pub offset: Vec2,
    /// Radius of the absorbed body
    pub stamp_radius: f32,
}

/// Build the next overlay from the previous one plus one stamp
///
/// The previous buffer is redrawn at `previous.radius / new_radius` scale about the
/// centre so existing content keeps its world size. The sprite (if any) is
/// drawn at `offset` rotated into the local frame, rotated by `-heading`, and
/// sized to the stamp's diameter.
pub fn composite(
    previous: Option<&Overlay>,
    resolution: u32,
    stamp: &Stamp,
    sprite: Option<&Image>,
) -> Overlay {
    let radius = stamp.new_radius.max(f32::EPSILON);
    let mut next = Overlay::blank(resolution, radius);
    next.revision = previous.map_or(1, |p| p.revision.wrapping_add(1));

    let half = Vec2::splat(resolution as f32 / 2.0);

    if let Some(prev) = previous {
        let prev_half = Vec2::splat(prev.resolution() as f32 / 2.0);
        // prev pixel -> prev local (old radius) -> next pixel (new radius)
        let scale =
            (prev.radius / radius) * (resolution as f32 / prev.resolution().max(1) as f32);
        let transform = Affine2::from_translation(half)
            * Affine2::from_scale(Vec2::splat(scale))
            * Affine2::from_translation(-prev_half);
        next.image.draw(&prev.image, transform);
    }

    if let Some(sprite) = sprite {
        let counter = -stamp.heading;
        let local = Vec2::from_angle(counter).rotate(stamp.offset);
        let center = next.local_to_pixel(local);
        let diameter_px = 2.0 * stamp.stamp_radius * next.pixels_per_unit();
        let scale = Vec2::new(
            diameter_px / sprite.width().max(1) as f32,
            diameter_px / sprite.height().max(1) as f32,
        );
        let transform = Affine2::from_scale_angle_translation(scale, counter, center)
            * Affine2::from_translation(-sprite.size() / 2.0);
        next.image.draw(sprite, transform);
    }

    next
}
