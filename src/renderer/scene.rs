//! Per-frame scene painting

use glam::Vec2;

use super::{Camera, Canvas, Color, Rect, Transform, Viewport};
use crate::sim::{Body, World};

/// Paint one frame: sky, ground, obstacles, then the roller on top
pub fn paint<C: Canvas>(canvas: &mut C, world: &World, viewport: Viewport) {
    let horizon = viewport.horizon();
    canvas.fill_rect(Color::SKY, Rect::new(0.0, 0.0, viewport.width, horizon));
    canvas.fill_rect(
        Color::GROUND,
        Rect::new(0.0, horizon, viewport.width, viewport.height - horizon),
    );

    let camera = Camera::follow(world, viewport);
    for body in world.obstacles().iter().filter(|b| b.alive) {
        paint_body(canvas, &camera, body);
    }
    paint_body(canvas, &camera, world.roller());
}

fn paint_body<C: Canvas>(canvas: &mut C, camera: &Camera, body: &Body) {
    let transform = Transform {
        translate: camera.to_screen(body.pos),
        rotate: body.theta,
        scale: camera.scale,
    };
    canvas.with_transform(transform, |c| {
        c.draw_sprite(&body.sprite, Vec2::splat(body.radius * 2.0));
        // Same transform as the body, so the overlay turns with it
        if let Some(overlay) = body.overlay() {
            c.draw_overlay(overlay, Vec2::splat(overlay.radius * 2.0));
        }
    });
}
