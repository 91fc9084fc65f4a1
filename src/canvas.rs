//! 2D drawing surface used by the effects and the slide view.
//!
//! Everything that draws goes through the [`Canvas`] trait, so the same code
//! renders into a software pixel buffer on screen ([`crate::raster::PixelCanvas`])
//! or into a [`Recorder`] in tests.

use glam::Vec2;
use std::fmt;

/// A straight-alpha color with 8-bit channels and a floating-point alpha.
///
/// Displays as a CSS-style `rgba(r, g, b, a)` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with a different opacity.
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same color with its opacity multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// A 2D immediate-mode drawing target.
///
/// Coordinates are in pixels with the origin at the top-left corner.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Fill an axis-aligned rectangle, blending over existing content.
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);

    /// Stroke a line segment of the given width.
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Draw a single character whose cell is `size` pixels tall, with its
    /// top-left corner at `origin`.
    fn glyph(&mut self, ch: char, origin: Vec2, size: f32, color: Rgba);

    /// Draw a run of characters left to right. Returns the advance width.
    fn text(&mut self, text: &str, origin: Vec2, size: f32, color: Rgba) -> f32 {
        let advance = crate::font::advance(size);
        let mut x = origin.x;
        for ch in text.chars() {
            self.glyph(ch, Vec2::new(x, origin.y), size, color);
            x += advance;
        }
        x - origin.x
    }

    /// Canvas dimensions as a vector.
    fn extent(&self) -> Vec2 {
        let (w, h) = self.size();
        Vec2::new(w as f32, h as f32)
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect { origin: Vec2, size: Vec2, color: Rgba },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Glyph { ch: char, origin: Vec2, size: f32, color: Rgba },
}

/// A canvas that records drawing calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    width: u32,
    height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Forget everything recorded so far.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Glyph { .. }))
    }
}

impl Canvas for Recorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Rect { origin, size, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn glyph(&mut self, ch: char, origin: Vec2, size: f32, color: Rgba) {
        self.commands.push(DrawCommand::Glyph {
            ch,
            origin,
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_display() {
        let c = Rgba::new(100, 200, 255, 0.5);
        assert_eq!(c.to_string(), "rgba(100, 200, 255, 0.5)");
    }

    #[test]
    fn test_rgba_from_hex() {
        assert_eq!(Rgba::from_hex("#00ff46"), Some(Rgba::rgb(0, 255, 70)));
        assert_eq!(Rgba::from_hex("00ff46"), None);
        assert_eq!(Rgba::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_fade_clamps() {
        let c = Rgba::WHITE.fade(2.0);
        assert_eq!(c.a, 1.0);
        let c = Rgba::WHITE.with_alpha(-1.0);
        assert_eq!(c.a, 0.0);
    }

    #[test]
    fn test_recorder_text_advances() {
        let mut rec = Recorder::new(100, 100);
        let width = rec.text("01", Vec2::ZERO, 14.0, Rgba::WHITE);
        assert_eq!(rec.glyphs().count(), 2);
        assert!(width > 0.0);
        match &rec.commands[1] {
            DrawCommand::Glyph { origin, .. } => assert!(origin.x > 0.0),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
