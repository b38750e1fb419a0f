//! A [`Canvas`] that records draw calls
//!
//! Used by tests and the headless driver. Each sprite and overlay is stored
//! with the full transform in effect when it was drawn.

use glam::{Affine2, Vec2};

use super::{Canvas, Color, Rect, Transform};
use crate::sim::{Overlay, SpriteId};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        color: Color,
        rect: Rect,
    },
    Sprite {
        sprite: SpriteId,
        size: Vec2,
        transform: Affine2,
    },
    Overlay {
        revision: u32,
        size: Vec2,
        transform: Affine2,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
    stack: Vec<Affine2>,
    current: Option<Affine2>,
}

impl RecordingCanvas {
    /// Forget recorded ops; the transform stack must already be balanced
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Open scoped transforms
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn transform(&self) -> Affine2 {
        self.current.unwrap_or(Affine2::IDENTITY)
    }

    /// Sprite draws in order as (sprite, size, transform)
    pub fn sprites(&self) -> impl Iterator<Item = (&SpriteId, Vec2, Affine2)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Sprite {
                sprite,
                size,
                transform,
            } => Some((sprite, *size, *transform)),
            _ => None,
        })
    }

    pub fn overlays(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Overlay { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, color: Color, rect: Rect) {
        self.ops.push(DrawOp::Fill { color, rect });
    }

    fn draw_sprite(&mut self, sprite: &SpriteId, size: Vec2) {
        self.ops.push(DrawOp::Sprite {
            sprite: sprite.clone(),
            size,
            transform: self.transform(),
        });
    }

    fn draw_overlay(&mut self, overlay: &Overlay, size: Vec2) {
        self.ops.push(DrawOp::Overlay {
            revision: overlay.revision,
            size,
            transform: self.transform(),
        });
    }

    fn push_transform(&mut self, transform: Transform) {
        let current = self.transform();
        self.stack.push(current);
        self.current = Some(current * transform.to_affine());
    }

    fn pop_transform(&mut self) {
        match self.stack.pop() {
            Some(previous) => self.current = Some(previous),
            None => log::warn!("pop_transform without matching push"),
        }
    }
}
