//! Owned RGBA pixel buffers and affine blits
//!
//! Just enough rasterisation for the rollup overlay: nearest-neighbour
//! sampling through an arbitrary 2D affine transform with alpha-over blending.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

/// One straight-alpha RGBA pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Composite `src` over `self`
    pub fn over(self, src: Rgba) -> Rgba {
        match src.a {
            0 => self,
            255 => src,
            _ => {
                let sa = src.a as u32;
                let da = self.a as u32 * (255 - sa) / 255;
                let out_a = sa + da;
                if out_a == 0 {
                    return Rgba::TRANSPARENT;
                }
                let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da) / out_a) as u8;
                Rgba::new(
                    mix(src.r, self.r),
                    mix(src.g, self.g),
                    mix(src.b, self.b),
                    out_a as u8,
                )
            }
        }
    }
}

/// A width × height pixel buffer, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Fully transparent image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Wrap raw RGBA8 bytes; `None` if the length does not match
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return None;
        }
        let pixels: Vec<Rgba> = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, suitable for handing to a host image API
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Number of pixels with any coverage
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// Draw `src` into `self`, mapping source pixel space through `src_to_dst`
    ///
    /// Only the destination pixels inside the transformed source bounds are
    /// visited. Degenerate (non-invertible) transforms draw nothing.
    pub fn draw(&mut self, src: &Image, src_to_dst: Affine2) {
        if src.width == 0 || src.height == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        if src_to_dst.matrix2.determinant().abs() < f32::EPSILON {
            return;
        }
        let dst_to_src = src_to_dst.inverse();

        let corners = [
            Vec2::ZERO,
            Vec2::new(src.width as f32, 0.0),
            Vec2::new(0.0, src.height as f32),
            src.size(),
        ]
        .map(|c| src_to_dst.transform_point2(c));
        let min = corners.iter().fold(Vec2::INFINITY, |m, c| m.min(*c));
        let max = corners.iter().fold(Vec2::NEG_INFINITY, |m, c| m.max(*c));

        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let s = dst_to_src.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if s.x < 0.0 || s.y < 0.0 {
                    continue;
                }
                let Some(color) = src.get(s.x as u32, s.y as u32) else {
                    continue;
                };
                let idx = (y * self.width + x) as usize;
                self.pixels[idx] = self.pixels[idx].over(color);
            }
        }
    }
}

/// A filled disc sprite, handy for placeholders and tests
pub fn disc(diameter: u32, color: Rgba) -> Image {
    let mut image = Image::new(diameter, diameter);
    let r = diameter as f32 / 2.0;
    for y in 0..diameter {
        for x in 0..diameter {
            let d = Vec2::new(x as f32 + 0.5 - r, y as f32 + 0.5 - r);
            if d.length_squared() <= r * r {
                image.put(x, y, color);
            }
        }
    }
    image
}
