//! Software rasterizer backing each on-screen canvas layer.
//!
//! Pixels are stored as premultiplied RGBA8 so layers composite with a
//! single multiply-add per channel. The final frame is a fully opaque layer,
//! which makes premultiplied and straight alpha identical when it is
//! uploaded to the GPU.

use glam::Vec2;

use crate::canvas::{Canvas, Rgba};
use crate::font;

/// A premultiplied RGBA8 pixel buffer implementing [`Canvas`].
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelCanvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; (width as usize) * (height as usize)],
        }
    }

    /// Resize, discarding the current contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 4]; (width as usize) * (height as usize)];
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        let px = premultiply(color);
        self.pixels.fill(px);
    }

    /// Raw premultiplied bytes, row-major, 4 bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Draw `layer` over this canvas scaled by `opacity`.
    ///
    /// Both canvases must be the same size; mismatched layers are skipped.
    pub fn composite(&mut self, layer: &PixelCanvas, opacity: f32) {
        if layer.width != self.width || layer.height != self.height {
            log::debug!(
                "Skipping composite of {}x{} layer onto {}x{} canvas",
                layer.width,
                layer.height,
                self.width,
                self.height
            );
            return;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == 0.0 {
            return;
        }
        for (dst, src) in self.pixels.iter_mut().zip(&layer.pixels) {
            if src[3] == 0 {
                continue;
            }
            let src = [
                src[0] as f32 / 255.0 * opacity,
                src[1] as f32 / 255.0 * opacity,
                src[2] as f32 / 255.0 * opacity,
                src[3] as f32 / 255.0 * opacity,
            ];
            blend_over(dst, src);
        }
    }

    #[inline]
    fn blend(&mut self, x: i64, y: i64, color: [f32; 4], coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        if coverage <= 0.0 {
            return;
        }
        let c = coverage.min(1.0);
        let idx = (y as usize) * (self.width as usize) + x as usize;
        blend_over(
            &mut self.pixels[idx],
            [color[0] * c, color[1] * c, color[2] * c, color[3] * c],
        );
    }
}

fn premultiply(color: Rgba) -> [u8; 4] {
    let a = color.a.clamp(0.0, 1.0);
    [
        (color.r as f32 * a).round() as u8,
        (color.g as f32 * a).round() as u8,
        (color.b as f32 * a).round() as u8,
        (a * 255.0).round() as u8,
    ]
}

fn premultiplied_f32(color: Rgba) -> [f32; 4] {
    let a = color.a.clamp(0.0, 1.0);
    [
        color.r as f32 / 255.0 * a,
        color.g as f32 / 255.0 * a,
        color.b as f32 / 255.0 * a,
        a,
    ]
}

/// Porter-Duff "source over" on a premultiplied pixel.
#[inline]
fn blend_over(dst: &mut [u8; 4], src: [f32; 4]) {
    let inv = 1.0 - src[3];
    for i in 0..4 {
        let d = dst[i] as f32 / 255.0;
        let v = src[i] + d * inv;
        dst[i] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// Length of the overlap between `[a0, a1)` and `[b0, b1)`.
#[inline]
fn overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        if size.x <= 0.0 || size.y <= 0.0 || color.a <= 0.0 {
            return;
        }
        let src = premultiplied_f32(color);
        let (x0, y0) = (origin.x, origin.y);
        let (x1, y1) = (origin.x + size.x, origin.y + size.y);
        let px0 = x0.floor().max(0.0) as i64;
        let py0 = y0.floor().max(0.0) as i64;
        let px1 = (x1.ceil() as i64).min(self.width as i64);
        let py1 = (y1.ceil() as i64).min(self.height as i64);

        for py in py0..py1 {
            let cy = overlap(py as f32, py as f32 + 1.0, y0, y1);
            for px in px0..px1 {
                let cx = overlap(px as f32, px as f32 + 1.0, x0, x1);
                self.blend(px, py, src, cx * cy);
            }
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        if color.a <= 0.0 || width <= 0.0 {
            return;
        }
        let src = premultiplied_f32(color);
        let delta = to - from;
        let length = delta.length();
        if length < f32::EPSILON {
            self.fill_circle(from, width * 0.5, color);
            return;
        }

        // Walk the major axis one pixel at a time and cover a span on the
        // minor axis whose height keeps the perpendicular width constant.
        let steep = delta.y.abs() > delta.x.abs();
        let (a0, b0, da, db) = if steep {
            (from.y, from.x, delta.y, delta.x)
        } else {
            (from.x, from.y, delta.x, delta.y)
        };
        let major = da.abs();
        let half = width * 0.5 * length / major;
        let slope = db / da;
        let (start, end) = if da >= 0.0 { (a0, a0 + da) } else { (a0 + da, a0) };

        let mut a = start.floor();
        while a < end {
            let cov_a = overlap(a, a + 1.0, start, end);
            let center = b0 + ((a + 0.5).clamp(start, end) - a0) * slope;
            let lo = center - half;
            let hi = center + half;
            let mut b = lo.floor();
            while b < hi {
                let cov = cov_a * overlap(b, b + 1.0, lo, hi);
                if steep {
                    self.blend(b as i64, a as i64, src, cov);
                } else {
                    self.blend(a as i64, b as i64, src, cov);
                }
                b += 1.0;
            }
            a += 1.0;
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 || color.a <= 0.0 {
            return;
        }
        let src = premultiplied_f32(color);
        let x0 = (center.x - radius - 1.0).floor() as i64;
        let x1 = (center.x + radius + 1.0).ceil() as i64;
        let y0 = (center.y - radius - 1.0).floor() as i64;
        let y1 = (center.y + radius + 1.0).ceil() as i64;

        for py in y0..y1 {
            for px in x0..x1 {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(center);
                // Tiny circles still deposit their area instead of vanishing.
                let cov = if radius < 0.5 {
                    if d < 0.5 {
                        std::f32::consts::PI * radius * radius
                    } else {
                        0.0
                    }
                } else {
                    (radius + 0.5 - d).clamp(0.0, 1.0)
                };
                self.blend(px, py, src, cov);
            }
        }
    }

    fn glyph(&mut self, ch: char, origin: Vec2, size: f32, color: Rgba) {
        let rows = font::glyph(ch);
        let px = font::pixel_size(size);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..font::GLYPH_W {
                if (bits >> (font::GLYPH_W - 1 - col)) & 1 == 0 {
                    continue;
                }
                self.fill_rect(
                    origin + Vec2::new(col as f32 * px, row as f32 * px),
                    Vec2::splat(px),
                    color,
                );
            }
        }
    }
}
